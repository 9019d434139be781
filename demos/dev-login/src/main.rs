//! Walks through the session lifecycle against on-disk storage:
//!
//! 1. dev-admin login injects an override
//! 2. a "restart" picks the override back up before the backend answers
//! 3. a real account signing in takes over from the override
//! 4. logout leaves nobody signed in
//!
//! Run with `RUST_LOG=debug cargo run -p dev-login` to see the store's
//! decisions. Pass a directory to keep the data between runs.

use std::time::Duration;

use eventide::prelude::*;

fn backend() -> InMemoryAuthBackend {
    InMemoryAuthBackend::new(BackendConfig {
        initial_delay: Duration::from_millis(50),
        ..Default::default()
    })
}

fn describe(snapshot: &SessionSnapshot) -> String {
    match snapshot.session.identity() {
        _ if snapshot.loading => "resolving...".to_string(),
        None => "signed out".to_string(),
        Some(identity) => format!(
            "{} ({}, admin: {})",
            identity.email,
            snapshot.session.source(),
            snapshot.session.is_admin()
        ),
    }
}

#[tokio::main]
async fn main() -> Result<(), EventideError> {
    eventide::init_tracing("info");

    let dir = std::env::args()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("eventide-dev-login"));
    let storage = FileStore::open(&dir)?;
    tracing::info!(dir = %dir.display(), "using storage directory");

    // First run: log in as the dev admin and publish an event.
    {
        let mut app = EventideApp::builder(storage.clone()).build(backend());
        app.mount()?;
        app.log_in("devadmin@eventide.com", "devpassword").await?;
        println!("after dev login:   {}", describe(&app.snapshot()));

        let event = app.publish_event(EventDraft {
            title: "Lantern Walk".into(),
            date: "2026-10-31".into(),
            time: "7:00 PM".into(),
            location: "Old Town Square".into(),
            description: "A guided evening walk through the old town.".into(),
            price: 0.0,
            ..Default::default()
        })?;
        app.bookings_mut().add(event)?;
        app.dispose();
    }

    // Restart: the override comes back from disk straight away.
    let backend = backend();
    backend.add_account("guest@example.com", "guestpass", Some("Guest"))?;
    let app = EventideApp::builder(storage).build(backend);
    let _changes = app.session().subscribe(|snapshot: &SessionSnapshot| {
        println!("  changed -> {}", describe(snapshot));
    });
    app.mount()?;
    println!("after restart:     {}", describe(&app.snapshot()));
    println!("bookings on disk:  {}", app.bookings().len());

    // The backend's first answer ("nobody") doesn't end the dev session.
    tokio::time::sleep(Duration::from_millis(100)).await;
    println!("backend answered:  {}", describe(&app.snapshot()));

    app.log_in("guest@example.com", "guestpass").await?;
    println!("after live login:  {}", describe(&app.snapshot()));

    app.log_out().await?;
    println!("after logout:      {}", describe(&app.snapshot()));

    app.dispose();
    Ok(())
}
