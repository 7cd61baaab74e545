use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{auth, routes};

#[derive(OpenApi)]
#[openapi(
    info(title = "Hotel Booking API"),
    paths(
        auth::register,
        auth::login,
        auth::refresh,
        auth::logout,
        auth::customer_profile,
        auth::owner_profile,
        routes::hotels::create_hotel,
        routes::hotels::search_hotels,
        routes::hotels::count_hotels,
        routes::hotels::get_hotel,
        routes::hotels::update_hotel,
        routes::hotels::delete_hotel,
        routes::hotels::hotel_availability,
        routes::rooms::create_room,
        routes::rooms::update_room,
        routes::rooms::get_room,
        routes::rooms::rooms_by_hotel,
        routes::rooms::room_availability,
        routes::rooms::available_rooms,
        routes::rooms::delete_room,
        routes::reservations::create_reservation,
        routes::reservations::get_reservation,
        routes::reservations::reservations_by_hotel,
        routes::reservations::reservations_by_room,
        routes::reservations::cancel_reservation,
        routes::reservations::update_payment,
        routes::reservations::check_in,
        routes::reservations::check_out,
        routes::payments::process_payment,
        routes::payments::refund_payment,
        routes::activities::create_activity,
        routes::activities::activities_by_hotel,
        routes::activities::available_activities,
        routes::activities::activities_in_range,
        routes::activities::get_activity,
        routes::activities::update_activity,
        routes::activities::cancel_activity,
        routes::activity_reservations::create_booking,
        routes::activity_reservations::get_booking,
        routes::activity_reservations::bookings_by_activity,
        routes::activity_reservations::bookings_by_hotel_reservation,
        routes::activity_reservations::cancel_booking,
        routes::activity_reservations::update_payment,
        routes::activity_reservations::check_in,
        routes::activity_reservations::complete,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth"),
        (name = "hotels"),
        (name = "rooms"),
        (name = "reservations"),
        (name = "payments"),
        (name = "activities"),
        (name = "activity-reservations")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
