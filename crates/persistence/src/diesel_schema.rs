// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Diesel table definitions matching `migrations/`.

diesel::table! {
    members (member_id) {
        member_id -> BigInt,
        last_name -> Text,
        first_name -> Text,
        agt_qualified -> Bool,
        full_time -> Bool,
        commander -> Bool,
        deputy_commander -> Bool,
    }
}

diesel::table! {
    vehicles (vehicle_id) {
        vehicle_id -> BigInt,
        vehicle_type -> Text,
        call_sign -> Text,
        registration -> Text,
    }
}

diesel::table! {
    containers (container_id) {
        container_id -> BigInt,
        container_type -> Text,
    }
}

diesel::table! {
    trailers (trailer_id) {
        trailer_id -> BigInt,
        trailer_type -> Text,
        registration -> Text,
    }
}

diesel::table! {
    lookup_entries (entry_id) {
        entry_id -> BigInt,
        kind -> Text,
        label -> Text,
    }
}

diesel::table! {
    keywords (keyword_id) {
        keyword_id -> BigInt,
        code -> Text,
        label -> Text,
        active -> Bool,
        category -> Text,
    }
}

diesel::table! {
    mail_recipients (recipient_id) {
        recipient_id -> BigInt,
        email -> Text,
        active -> Bool,
    }
}

diesel::table! {
    incidents (incident_id) {
        incident_id -> BigInt,
        year -> Integer,
        seq -> Integer,
        keyword_id -> BigInt,
        start_at -> Text,
        end_at -> Text,
        leader_member_id -> Nullable<BigInt>,
        leader_text -> Text,
        reporting_agency_id -> Nullable<BigInt>,
        object_name -> Text,
        street -> Text,
        postal_city -> Text,
        municipality -> Text,
        district -> Text,
        fire_extent_id -> Nullable<BigInt>,
        fire_spread_id -> Nullable<BigInt>,
        fire_material_id -> Nullable<BigInt>,
        fire_object_id -> Nullable<BigInt>,
        damage_event_id -> Nullable<BigInt>,
        rescue_type_id -> Nullable<BigInt>,
        rescued_count -> Nullable<Integer>,
        standby_id -> Nullable<BigInt>,
        false_alarm_id -> Nullable<BigInt>,
        other_id -> Nullable<BigInt>,
        measures -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    incident_parties (party_id) {
        party_id -> BigInt,
        incident_id -> BigInt,
        party_type -> Text,
        name -> Text,
        street -> Text,
        postal_city -> Text,
        phone -> Text,
        vehicle_plate -> Text,
        cost_exempt -> Bool,
        exemption_reason -> Text,
    }
}

diesel::table! {
    incident_water_supplies (water_supply_id) {
        water_supply_id -> BigInt,
        incident_id -> BigInt,
        source_id -> BigInt,
        quantity -> Nullable<Double>,
    }
}

diesel::table! {
    incident_resources (incident_resource_id) {
        incident_resource_id -> BigInt,
        incident_id -> BigInt,
        resource_id -> BigInt,
        quantity -> Integer,
    }
}

diesel::table! {
    incident_vehicles (incident_vehicle_id) {
        incident_vehicle_id -> BigInt,
        incident_id -> BigInt,
        vehicle_id -> BigInt,
        kilometers -> Nullable<Integer>,
        hours -> Nullable<Double>,
        required -> Bool,
    }
}

diesel::table! {
    incident_containers (incident_container_id) {
        incident_container_id -> BigInt,
        incident_id -> BigInt,
        container_id -> BigInt,
        required -> Bool,
    }
}

diesel::table! {
    incident_trailers (incident_trailer_id) {
        incident_trailer_id -> BigInt,
        incident_id -> BigInt,
        trailer_id -> BigInt,
        kilometers -> Nullable<Integer>,
        hours -> Nullable<Double>,
        required -> Bool,
    }
}

diesel::table! {
    incident_brigades (incident_brigade_id) {
        incident_brigade_id -> BigInt,
        incident_id -> BigInt,
        brigade_id -> BigInt,
        required -> Bool,
    }
}

diesel::table! {
    incident_agencies (incident_agency_id) {
        incident_agency_id -> BigInt,
        incident_id -> BigInt,
        agency_id -> BigInt,
    }
}

diesel::table! {
    incident_attendance (incident_attendance_id) {
        incident_attendance_id -> BigInt,
        incident_id -> BigInt,
        member_id -> BigInt,
        vehicle_role -> Text,
        agt_minutes -> Nullable<Integer>,
    }
}

diesel::table! {
    duties (duty_id) {
        duty_id -> BigInt,
        year -> Integer,
        seq -> Integer,
        title -> Text,
        start_at -> Text,
        end_at -> Text,
        description -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    duty_vehicles (duty_vehicle_id) {
        duty_vehicle_id -> BigInt,
        duty_id -> BigInt,
        vehicle_id -> BigInt,
        kilometers -> Nullable<Integer>,
        hours -> Nullable<Double>,
    }
}

diesel::table! {
    duty_containers (duty_container_id) {
        duty_container_id -> BigInt,
        duty_id -> BigInt,
        container_id -> BigInt,
        required -> Bool,
    }
}

diesel::table! {
    duty_trailers (duty_trailer_id) {
        duty_trailer_id -> BigInt,
        duty_id -> BigInt,
        trailer_id -> BigInt,
        kilometers -> Nullable<Integer>,
        hours -> Nullable<Double>,
    }
}

diesel::table! {
    duty_attendance (duty_attendance_id) {
        duty_attendance_id -> BigInt,
        duty_id -> BigInt,
        member_id -> BigInt,
        vehicle_role -> Text,
        agt_minutes -> Nullable<Integer>,
    }
}

diesel::table! {
    operators (operator_id) {
        operator_id -> BigInt,
        login_name -> Text,
        display_name -> Text,
        password_hash -> Text,
        role -> Text,
        is_disabled -> Bool,
        created_at -> Text,
        last_login_at -> Nullable<Text>,
    }
}

diesel::table! {
    sessions (session_id) {
        session_id -> BigInt,
        session_token -> Text,
        operator_id -> BigInt,
        created_at -> Text,
        last_activity_at -> Text,
        expires_at -> Text,
    }
}

diesel::joinable!(incidents -> keywords (keyword_id));
diesel::joinable!(incident_water_supplies -> lookup_entries (source_id));
diesel::joinable!(incident_resources -> lookup_entries (resource_id));
diesel::joinable!(incident_vehicles -> vehicles (vehicle_id));
diesel::joinable!(incident_containers -> containers (container_id));
diesel::joinable!(incident_trailers -> trailers (trailer_id));
diesel::joinable!(incident_brigades -> lookup_entries (brigade_id));
diesel::joinable!(incident_agencies -> lookup_entries (agency_id));
diesel::joinable!(incident_attendance -> members (member_id));
diesel::joinable!(duty_vehicles -> vehicles (vehicle_id));
diesel::joinable!(duty_containers -> containers (container_id));
diesel::joinable!(duty_trailers -> trailers (trailer_id));
diesel::joinable!(duty_attendance -> members (member_id));
diesel::joinable!(sessions -> operators (operator_id));

diesel::allow_tables_to_appear_in_same_query!(
    members,
    vehicles,
    containers,
    trailers,
    lookup_entries,
    keywords,
    mail_recipients,
    incidents,
    incident_parties,
    incident_water_supplies,
    incident_resources,
    incident_vehicles,
    incident_containers,
    incident_trailers,
    incident_brigades,
    incident_agencies,
    incident_attendance,
    duties,
    duty_vehicles,
    duty_containers,
    duty_trailers,
    duty_attendance,
    operators,
    sessions,
);
