mod common;

use chrono::NaiveDate;
use common::TestApp;
use safari_connect::{
    domain::models::booking::{AccommodationBookingPatch, BookingStatus, TransportBookingPatch},
    domain::models::listing::{Accommodation, NewAccommodationParams, NewTransportParams, Transport},
    domain::models::user::{NewUserParams, Role, User},
    domain::services::access_policy::Caller,
    domain::services::admission::{AccommodationBookingRequest, TransportBookingRequest},
    error::AppError,
};
use tokio::task::JoinSet;

async fn seed_user(app: &TestApp, email: &str, role: Role) -> Caller {
    let user = User::new(NewUserParams {
        name: email.to_string(),
        email: email.to_string(),
        phone_number: None,
        password_hash: "not-a-real-hash".to_string(),
        role,
    });
    let created = app.state.user_repo.create(&user).await.unwrap();
    Caller::new(created.id, role)
}

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_overlapping_stays_admit_exactly_one() {
    let app = TestApp::new().await;
    let host = seed_user(&app, "host@example.com", Role::Host).await;

    let accommodation = Accommodation::new(NewAccommodationParams {
        host_id: host.user_id.clone(),
        title: "Ngorongoro Crater Lodge".to_string(),
        description: "Rim views".to_string(),
        location: "Ngorongoro".to_string(),
        price_per_night: 300.0,
        capacity: 2,
        available: None,
    }).unwrap();
    let accommodation = app.state.accommodation_repo.create(&accommodation).await.unwrap();

    let mut tourists = Vec::new();
    for i in 0..20 {
        tourists.push(seed_user(&app, &format!("tourist{}@example.com", i), Role::Tourist).await);
    }

    let mut set = JoinSet::new();
    for (i, tourist) in tourists.into_iter().enumerate() {
        let admission = app.state.admission.clone();
        let accommodation_id = accommodation.id.clone();
        // Every request overlaps every other one on 2026-01-20.
        let check_in = date("2026-01-20") - chrono::Duration::days((i % 3) as i64);
        set.spawn(async move {
            admission.create_accommodation_booking(&tourist, AccommodationBookingRequest {
                accommodation_id,
                check_in_date: check_in,
                check_out_date: date("2026-01-21"),
                total_price: None,
            }).await
        });
    }

    let mut admitted = 0;
    let mut conflicts = 0;
    while let Some(result) = set.join_next().await {
        match result.unwrap() {
            Ok(_) => admitted += 1,
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(e) => panic!("unexpected admission error: {:?}", e),
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(conflicts, 19);

    let stored = app.state.accommodation_booking_repo.list_by_accommodation(&accommodation.id).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_seat_requests_never_exceed_capacity() {
    let app = TestApp::new().await;
    let driver = seed_user(&app, "driver@example.com", Role::Driver).await;

    let transport = Transport::new(NewTransportParams {
        driver_id: driver.user_id.clone(),
        vehicle_type: "Safari Van".to_string(),
        price_per_day: 60.0,
        total_capacity: 6,
        available: None,
    }).unwrap();
    let transport = app.state.transport_repo.create(&transport).await.unwrap();

    let mut tourists = Vec::new();
    for i in 0..10 {
        tourists.push(seed_user(&app, &format!("rider{}@example.com", i), Role::Tourist).await);
    }

    let mut set = JoinSet::new();
    for tourist in tourists {
        let admission = app.state.admission.clone();
        let transport_id = transport.id.clone();
        set.spawn(async move {
            admission.create_transport_booking(&tourist, TransportBookingRequest {
                transport_id,
                travel_date: date("2026-06-15"),
                seats_booked: 1,
                total_price: None,
            }).await
        });
    }

    let mut admitted = 0;
    while let Some(result) = set.join_next().await {
        match result.unwrap() {
            Ok(_) => admitted += 1,
            Err(AppError::Conflict(_)) => {}
            Err(e) => panic!("unexpected admission error: {:?}", e),
        }
    }
    assert_eq!(admitted, 6);

    let booked = app.state.transport_booking_repo
        .seats_booked_on(&transport.id, date("2026-06-15"), None)
        .await
        .unwrap();
    assert_eq!(booked, 6);
}

async fn seed_accommodation(app: &TestApp, host: &Caller) -> Accommodation {
    let accommodation = Accommodation::new(NewAccommodationParams {
        host_id: host.user_id.clone(),
        title: "Tarangire Treetops".to_string(),
        description: "Baobab platforms".to_string(),
        location: "Tarangire".to_string(),
        price_per_night: 200.0,
        capacity: 2,
        available: None,
    }).unwrap();
    app.state.accommodation_repo.create(&accommodation).await.unwrap()
}

#[tokio::test]
async fn test_update_after_cancel_cannot_revive_booking() {
    let app = TestApp::new().await;
    let host = seed_user(&app, "host@example.com", Role::Host).await;
    let tourist = seed_user(&app, "tourist@example.com", Role::Tourist).await;
    let accommodation = seed_accommodation(&app, &host).await;

    let booking = app.state.admission.create_accommodation_booking(&tourist, AccommodationBookingRequest {
        accommodation_id: accommodation.id.clone(),
        check_in_date: date("2026-03-01"),
        check_out_date: date("2026-03-04"),
        total_price: None,
    }).await.unwrap();

    // The tourist loaded the booking as pending; the host cancels it before the edit lands.
    let seen = app.state.admission.get_accommodation_booking(&tourist, &booking.id).await.unwrap();
    assert_eq!(seen.status, "pending");
    app.state.admission.cancel_accommodation_booking(&host, &booking.id).await.unwrap();

    let repriced = app.state.admission.update_accommodation_booking(&tourist, &seen.id, AccommodationBookingPatch {
        total_price: Some(999.0),
        ..Default::default()
    }).await;
    match repriced {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "status"),
        other => panic!("expected validation error on status, got {:?}", other),
    }

    let reopened = app.state.accommodation_booking_repo.update_if_available(&seen.id, AccommodationBookingPatch {
        status: Some(BookingStatus::Pending),
        ..Default::default()
    }).await;
    assert!(matches!(reopened, Err(AppError::Validation { .. })));

    let stored = app.state.accommodation_booking_repo.find_by_id(&booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, "cancelled");
    assert_eq!(stored.total_price, booking.total_price);
}

#[tokio::test]
async fn test_seat_change_after_cancel_keeps_seats_released() {
    let app = TestApp::new().await;
    let driver = seed_user(&app, "driver@example.com", Role::Driver).await;
    let tourist = seed_user(&app, "rider@example.com", Role::Tourist).await;

    let transport = Transport::new(NewTransportParams {
        driver_id: driver.user_id.clone(),
        vehicle_type: "Overland Truck".to_string(),
        price_per_day: 45.0,
        total_capacity: 4,
        available: None,
    }).unwrap();
    let transport = app.state.transport_repo.create(&transport).await.unwrap();

    let booking = app.state.admission.create_transport_booking(&tourist, TransportBookingRequest {
        transport_id: transport.id.clone(),
        travel_date: date("2026-07-02"),
        seats_booked: 2,
        total_price: None,
    }).await.unwrap();

    app.state.admission.cancel_transport_booking(&driver, &booking.id).await.unwrap();

    let grown = app.state.admission.update_transport_booking(&tourist, &booking.id, TransportBookingPatch {
        seats_booked: Some(3),
        ..Default::default()
    }).await;
    assert!(matches!(grown, Err(AppError::Validation { .. })));

    let booked = app.state.transport_booking_repo
        .seats_booked_on(&transport.id, date("2026-07-02"), None)
        .await
        .unwrap();
    assert_eq!(booked, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_cancel_and_reprice_leave_bookings_cancelled() {
    let app = TestApp::new().await;
    let host = seed_user(&app, "host@example.com", Role::Host).await;
    let tourist = seed_user(&app, "tourist@example.com", Role::Tourist).await;
    let accommodation = seed_accommodation(&app, &host).await;

    let mut ids = Vec::new();
    for week in 0..12 {
        let check_in = date("2026-01-05") + chrono::Duration::weeks(week);
        let booking = app.state.admission.create_accommodation_booking(&tourist, AccommodationBookingRequest {
            accommodation_id: accommodation.id.clone(),
            check_in_date: check_in,
            check_out_date: check_in + chrono::Duration::days(2),
            total_price: None,
        }).await.unwrap();
        ids.push(booking.id);
    }

    let mut set = JoinSet::new();
    for id in &ids {
        let admission = app.state.admission.clone();
        let (caller, booking_id) = (host.clone(), id.clone());
        set.spawn(async move {
            admission.cancel_accommodation_booking(&caller, &booking_id).await.map(|_| ())
        });

        let admission = app.state.admission.clone();
        let (caller, booking_id) = (tourist.clone(), id.clone());
        set.spawn(async move {
            admission.update_accommodation_booking(&caller, &booking_id, AccommodationBookingPatch {
                total_price: Some(1.0),
                ..Default::default()
            }).await.map(|_| ())
        });
    }

    while let Some(result) = set.join_next().await {
        match result.unwrap() {
            Ok(()) | Err(AppError::Validation { .. }) => {}
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    for id in &ids {
        let stored = app.state.accommodation_booking_repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.status, "cancelled", "booking {} left cancelled", id);
    }
}
