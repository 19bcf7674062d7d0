// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use mi3ad_domain::{BookingStatus, Price};

use crate::tests::create_test_registration;
use crate::{Persistence, PersistenceError};

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1: Persistence = Persistence::new_in_memory().unwrap();
    let mut db2: Persistence = Persistence::new_in_memory().unwrap();

    db1.register_booking(&create_test_registration("b1", "evt-1", "QR-1", 1, Price::FREE))
        .unwrap();

    assert_eq!(db1.list_bookings(None).unwrap().len(), 1);
    assert_eq!(db2.list_bookings(None).unwrap().len(), 0);
}

#[test]
fn test_migrations_applied_on_initialization() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let result = persistence.count_bookings_by_status(BookingStatus::Confirmed);

    assert_eq!(
        result,
        Ok(0),
        "Migrations must have applied for bookings table to exist"
    );
}

#[test]
fn test_file_database_persists_across_reopen() {
    let path = std::env::temp_dir().join(format!(
        "mi3ad_gate_test_{}_{}.db",
        std::process::id(),
        line!()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
        persistence
            .register_booking(&create_test_registration("b1", "evt-1", "QR-1", 1, Price::FREE))
            .unwrap();
    }

    let mut reopened: Persistence = Persistence::new_with_file(&path).unwrap();
    assert_eq!(reopened.list_bookings(None).unwrap().len(), 1);

    drop(reopened);
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}
