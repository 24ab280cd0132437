#[cfg(test)]
mod tests_closure {
    use super::super::closure::{closure, closure_sorted, ClosureEngine};
    use super::super::operation_parser::parse_operation;
    use super::super::symmetry_operations::{MagneticOperation, OgMagneticOperation};
    use crate::error::MsgError;
    use crate::interfaces::setting::{Bns, Og};

    fn ops(texts: &[&str]) -> Vec<MagneticOperation> {
        texts
            .iter()
            .map(|text| parse_operation::<Bns>(text).unwrap())
            .collect()
    }

    // ==================== Known Group Orders ====================

    #[test]
    fn test_closure_of_identity() {
        let group = closure(&[MagneticOperation::<Bns>::identity()]).unwrap();
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_closure_of_inversion_and_time_reversal() {
        let group = closure(&ops(&["-x,-y,-z", "x,y,z,-1"])).unwrap();
        assert_eq!(group.len(), 4);
        assert!(group.iter().any(|op| op.is_identity()));
        assert!(group.contains(&parse_operation::<Bns>("-x,-y,-z,-1").unwrap()));
    }

    #[test]
    fn test_closure_of_cubic_gray_group() {
        // Pm-3m1'
        let group = closure(&ops(&["z,x,y", "-y,x,z", "-x,-y,-z", "x,y,z,-1"])).unwrap();
        assert_eq!(group.len(), 96);
    }

    #[test]
    fn test_closure_of_hexagonal_groups() {
        // P6/mmm
        let group = closure(&ops(&["x-y,x,z", "-x,-y,-z", "y,x,-z"])).unwrap();
        assert_eq!(group.len(), 24);

        // P6_3/mmc
        let group = closure(&ops(&["x-y,x,z+1/2", "-x,-y,-z", "y,x,-z"])).unwrap();
        assert_eq!(group.len(), 24);
    }

    #[test]
    fn test_closure_with_centring_translations() {
        // Fm-3m
        let group = closure(&ops(&[
            "z,x,y",
            "-y,x,z",
            "-x,-y,-z",
            "x,y+1/2,z+1/2",
            "x+1/2,y,z+1/2",
        ]))
        .unwrap();
        assert_eq!(group.len(), 192);
    }

    #[test]
    fn test_closure_with_anti_translation() {
        // P_2s-1: the anti-translation squares to a pure lattice translation
        let group = closure(&ops(&["-x,-y,-z", "x,y,z+1/2,-1"])).unwrap();
        assert_eq!(group.len(), 4);
    }

    // ==================== Structure of the Result ====================

    #[test]
    fn test_seeds_come_first_without_duplicates() {
        let seeds = ops(&["-x,-y,z", "-x,-y,z", "x,y,-z"]);
        let group = closure(&seeds).unwrap();
        assert_eq!(group[0], seeds[0]);
        assert_eq!(group[1], seeds[2]);
        assert_eq!(group.len(), 4);
    }

    #[test]
    fn test_closure_has_no_duplicates() {
        let group = closure(&ops(&["z,x,y", "-y,x,z", "-x,-y,-z"])).unwrap();
        let mut sorted = group.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), group.len());
    }

    #[test]
    fn test_sorted_closure() {
        let group = closure_sorted(&ops(&["-x,-y,-z", "x,y,z,-1"])).unwrap();
        assert!(group.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(group.last().unwrap(), &MagneticOperation::identity());
    }

    #[test]
    fn test_closure_is_idempotent() {
        let group = closure(&ops(&["-y,x,z+1/4", "-x,-y,-z"])).unwrap();
        let again = closure(&group).unwrap();
        assert_eq!(again, group);
    }

    #[test]
    fn test_empty_seed_set() {
        let group: Vec<MagneticOperation> = closure(&[]).unwrap();
        assert!(group.is_empty());
    }

    #[test]
    fn test_is_closed() {
        let engine = ClosureEngine::new();
        let generators = ops(&["-x,-y,-z", "x,y,z,-1"]);
        assert!(!engine.is_closed(&generators).unwrap());

        let group = engine.closure(&generators).unwrap();
        assert!(engine.is_closed(&group).unwrap());

        let mut with_repeat = group.clone();
        with_repeat.push(group[0].clone());
        assert!(engine.is_closed(&with_repeat).unwrap());
    }

    // ==================== Safety Caps ====================

    #[test]
    fn test_og_translation_diverges_under_round_cap() {
        let shift: OgMagneticOperation = parse_operation::<Og>("x+1/2,y,z").unwrap();
        let engine = ClosureEngine::new().with_max_rounds(5);
        match engine.closure(&[shift]) {
            Err(MsgError::ClosureDivergence { rounds, size }) => {
                assert_eq!(rounds, 5);
                assert!(size > 5);
            }
            other => panic!("expected divergence, got {:?}", other),
        }
    }

    #[test]
    fn test_size_cap() {
        let engine = ClosureEngine::new().with_max_operations(10);
        let result = engine.closure(&ops(&["z,x,y", "-y,x,z", "-x,-y,-z"]));
        match result {
            Err(MsgError::ClosureDivergence { size, .. }) => assert_eq!(size, 11),
            other => panic!("expected divergence, got {:?}", other),
        }
    }

    #[test]
    fn test_default_caps_do_not_limit_real_groups() {
        let engine = ClosureEngine::default();
        let group = engine
            .closure(&ops(&["z,x,y", "-y,x,z", "-x,-y,-z", "x,y+1/2,z+1/2", "x+1/2,y,z+1/2", "x,y,z,-1"]))
            .unwrap();
        assert_eq!(group.len(), 384);
    }
}
