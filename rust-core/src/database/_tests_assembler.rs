#[cfg(test)]
mod tests_assembler {
    use super::super::_test_fixtures::{fixture_database, fixture_raw_database};
    use super::super::assembler::DatabaseAssembler;
    use super::super::groups::Group;
    use crate::error::MsgError;
    use crate::interfaces::setting::Bns;
    use crate::interfaces::Basis;
    use crate::symmetries::operation_parser::parse_operation;
    use crate::symmetries::rational_vector::RationalVector3;
    use crate::symmetries::symmetry_operations::{MagneticOperation, TimeReversal};
    use nalgebra::Matrix3;
    use num_rational::Rational64;

    fn op(text: &str) -> MagneticOperation {
        parse_operation::<Bns>(text).unwrap()
    }

    // ==================== Single Groups ====================

    #[test]
    fn test_identity_group() {
        let database = fixture_database();
        let group = database.group(1).unwrap();

        assert_eq!(group.number, 1);
        assert_eq!(group.group_type, 1);
        assert_eq!(group.symbol, "P1");
        assert_eq!(group.bns.number, (1, 1));
        assert_eq!(group.og.number, (1, 1, 1));

        assert_eq!(group.bns.operations.len(), 1);
        let identity = &group.bns.operations[0];
        assert!(identity.is_identity());
        assert_eq!(identity.time_reversal(), TimeReversal::Plus);
        assert_eq!(identity.name(), Some("s1"));

        assert_eq!(group.og.operations.len(), 1);
        assert!(group.og.operations[0].is_identity());
        assert!(group.bns_og_transform.is_identity());
    }

    #[test]
    fn test_gray_group() {
        let database = fixture_database();
        let group = database.group(2).unwrap();

        assert_eq!(group.bns.operations.len(), 4);
        assert_eq!(group.primed_operation_count(), 2);
        assert_eq!(group.bns.operations[1], op("-x,-y,-z"));
        assert_eq!(group.bns.operations[3], op("-x,-y,-z,-1"));

        let site_b = &group.bns.wyckoff_sites[1];
        assert_eq!(
            site_b.positions[0].position,
            RationalVector3::new(Rational64::from_integer(0), Rational64::from_integer(0), Rational64::new(1, 2))
        );
        assert_eq!(group.bns.wyckoff_sites[0].label, "a");
    }

    #[test]
    fn test_og_copy_of_non_type_4_group() {
        let database = fixture_database();
        for group in database.iter().filter(|group| !group.is_type_4()) {
            assert!(group.bns_og_transform.is_identity());
            assert_eq!(group.og.operations.len(), group.bns.operations.len());
            for (og, bns) in group.og.operations.iter().zip(&group.bns.operations) {
                assert_eq!(og.in_setting::<Bns>().unwrap(), *bns);
                assert_eq!(og.name(), bns.name());
            }
            assert_eq!(group.og.lattice_vectors, group.bns.lattice_vectors);
            assert_eq!(group.og.wyckoff_sites, group.bns.wyckoff_sites);
        }
    }

    #[test]
    fn test_type_4_group() {
        let database = fixture_database();
        let group = database.group(3).unwrap();
        assert!(group.is_type_4());
        assert_eq!(group.og.symbol, "P_2s-1");
        assert_eq!(group.og.number_string, "2.4.6");

        let transform = &group.bns_og_transform;
        assert_eq!(transform.matrix, Matrix3::new(2, 0, 0, 0, 1, 0, 0, 0, 1));
        assert_eq!(transform.origin[0], Rational64::new(1, 4));
        assert!(!transform.is_identity());

        // The anti-translation
        assert_eq!(group.bns.operations[2], op("x+1/2,y,z,-1"));
        assert_eq!(group.bns.lattice_vectors[0][0], Rational64::new(1, 2));

        // OG translations may reach a whole cell
        assert_eq!(group.og.operations[2].translation()[0], Rational64::from_integer(1));
        assert_eq!(group.og.operations[2].time_reversal(), TimeReversal::Minus);
        assert_eq!(group.og.lattice_vectors, vec![RationalVector3::from_integers([2, 0, 0])]);
        assert!(group.og.wyckoff_sites.is_empty());
    }

    #[test]
    fn test_hexagonal_group_uses_hexagonal_table() {
        let database = fixture_database();
        let group = database.group(4).unwrap();
        assert_eq!(group.basis(), Basis::Hexagonal);
        assert_eq!(group.bns.operations[1], op("x-y,x,z"));
        assert!(group.bns.operations.iter().all(|op| op.name().unwrap().starts_with('h')));
    }

    // ==================== Errors ====================

    #[test]
    fn test_unknown_point_operation_id() {
        let mut raw = fixture_raw_database();
        raw.records[0].bns.operators[0].point_operation_id = 49;
        let result = DatabaseAssembler::new().assemble_group(&raw.records[0], &raw.point_operations);
        assert!(matches!(result, Err(MsgError::Validation(_))));
    }

    #[test]
    fn test_hexagonal_id_out_of_range() {
        let mut raw = fixture_raw_database();
        raw.records[3].bns.operators[0].point_operation_id = 25;
        let result = DatabaseAssembler::new().assemble_group(&raw.records[3], &raw.point_operations);
        assert!(matches!(result, Err(MsgError::Validation(_))));
    }

    #[test]
    fn test_invalid_time_inversion_flag() {
        let mut raw = fixture_raw_database();
        raw.records[0].bns.operators[0].time_inversion = 2;
        let result = DatabaseAssembler::new().assemble(&raw);
        assert!(matches!(result, Err(MsgError::Validation(_))));
    }

    #[test]
    fn test_bns_translation_out_of_cell() {
        let mut raw = fixture_raw_database();
        raw.records[0].bns.operators[0].numerators = [1, 0, 0];
        let result = DatabaseAssembler::new().assemble_group(&raw.records[0], &raw.point_operations);
        assert!(matches!(result, Err(MsgError::Validation(_))));
    }

    #[test]
    fn test_og_section_without_transform() {
        let mut raw = fixture_raw_database();
        raw.records[2].transform = None;
        let result = DatabaseAssembler::new().assemble_group(&raw.records[2], &raw.point_operations);
        assert!(matches!(result, Err(MsgError::Validation(_))));
    }

    #[test]
    fn test_closure_check() {
        let mut raw = fixture_raw_database();
        raw.records[1].bns.operators.pop();

        let checked = DatabaseAssembler::new().with_closure_check(true);
        match checked.assemble_group(&raw.records[1], &raw.point_operations) {
            Err(MsgError::Validation(message)) => assert!(message.contains("3 stored BNS operations close to 4")),
            other => panic!("expected a validation error, got {:?}", other),
        }

        let unchecked = DatabaseAssembler::new();
        let group = unchecked.assemble_group(&raw.records[1], &raw.point_operations).unwrap();
        assert_eq!(group.bns.operations.len(), 3);
    }

    // ==================== Whole Database ====================

    #[test]
    fn test_assembly_matches_group_by_group() {
        let raw = fixture_raw_database();
        let assembler = DatabaseAssembler::new();
        let database = assembler.assemble(&raw).unwrap();
        let one_by_one: Vec<Group> = raw
            .records
            .iter()
            .map(|record| assembler.assemble_group(record, &raw.point_operations).unwrap())
            .collect();
        assert_eq!(database.groups(), one_by_one.as_slice());
        assert_eq!(database.point_operations(), &raw.point_operations);
    }

    #[test]
    fn test_group_numbers_follow_source_order() {
        let database = fixture_database();
        let numbers: Vec<u32> = database.iter().map(|group| group.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }
}
