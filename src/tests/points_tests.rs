#[cfg(test)]
mod tests {
    use crate::models::ServiceError;
    use crate::services::watch::WatchRegistry;
    use crate::services::{membership, points};
    use crate::tests::{cleanup, member, test_store};

    #[test]
    fn add_points_accumulates_deltas() {
        let (store, dir) = test_store();
        let registry = WatchRegistry::new();
        let owner = member("owner-1", "Alice");

        let team = membership::create_team(&store, "Alpha", "", 0, &owner).unwrap();

        for delta in [50, 25, -10] {
            points::add_points(&store, &registry, &team.id, "owner-1", delta).unwrap();
        }

        let updated = store.find_membership(&team.id, "owner-1").unwrap().unwrap();
        assert_eq!(updated.points, 65, "Final total must equal the sum of deltas");

        let last_change = updated.last_point_change.unwrap();
        assert_eq!(last_change.amount, -10, "Audit record holds the last delta");

        cleanup(&dir);
    }

    #[test]
    fn add_points_requires_membership() {
        let (store, dir) = test_store();
        let registry = WatchRegistry::new();
        let owner = member("owner-1", "Alice");

        let team = membership::create_team(&store, "Alpha", "", 0, &owner).unwrap();

        let result = points::add_points(&store, &registry, &team.id, "stranger", 10);

        assert!(matches!(result, Err(ServiceError::NotMember)));

        cleanup(&dir);
    }

    #[test]
    fn add_points_allows_negative_totals() {
        let (store, dir) = test_store();
        let registry = WatchRegistry::new();
        let owner = member("owner-1", "Alice");

        let team = membership::create_team(&store, "Alpha", "", 0, &owner).unwrap();

        let updated = points::add_points(&store, &registry, &team.id, "owner-1", -5).unwrap();

        assert_eq!(updated.points, -5, "Totals are not clamped at zero");

        cleanup(&dir);
    }

    #[test]
    fn set_points_records_absolute_value_in_audit() {
        let (store, dir) = test_store();
        let registry = WatchRegistry::new();
        let owner = member("owner-1", "Alice");

        let team = membership::create_team(&store, "Alpha", "", 0, &owner).unwrap();
        points::add_points(&store, &registry, &team.id, "owner-1", 99).unwrap();

        let updated = points::set_points(&store, &registry, &team.id, "owner-1", 42).unwrap();

        assert_eq!(updated.points, 42);
        let last_change = updated.last_point_change.unwrap();
        assert_eq!(
            last_change.amount, 42,
            "set_points stores the new total in the audit record, not a delta"
        );

        cleanup(&dir);
    }

    #[test]
    fn set_points_requires_membership() {
        let (store, dir) = test_store();
        let registry = WatchRegistry::new();
        let owner = member("owner-1", "Alice");

        let team = membership::create_team(&store, "Alpha", "", 0, &owner).unwrap();

        let result = points::set_points(&store, &registry, &team.id, "stranger", 42);

        assert!(matches!(result, Err(ServiceError::NotMember)));

        cleanup(&dir);
    }

    #[test]
    fn reset_points_zeroes_every_member_and_requires_owner() {
        let (store, dir) = test_store();
        let registry = WatchRegistry::new();
        let owner = member("owner-1", "Alice");
        let joiner = member("u-1", "Uma");

        let team = membership::create_team(&store, "Alpha", "", 7, &owner).unwrap();
        membership::join_by_code(&store, &registry, &team.join_code, &joiner).unwrap();
        points::add_points(&store, &registry, &team.id, "owner-1", 50).unwrap();
        points::add_points(&store, &registry, &team.id, "u-1", 75).unwrap();

        let result = points::reset_points(&store, &registry, &team.id, "u-1");
        assert!(matches!(result, Err(ServiceError::NotAuthorized)));

        let untouched = store.find_membership(&team.id, "u-1").unwrap().unwrap();
        assert_eq!(untouched.points, 75, "A rejected reset must not change points");

        let reset_count = points::reset_points(&store, &registry, &team.id, "owner-1").unwrap();
        assert_eq!(reset_count, 2);

        for user_id in ["owner-1", "u-1"] {
            let membership_doc = store.find_membership(&team.id, user_id).unwrap().unwrap();
            assert_eq!(membership_doc.points, 0);
            assert_eq!(membership_doc.last_point_change.unwrap().amount, 0);
        }

        cleanup(&dir);
    }
}
