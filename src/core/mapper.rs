// TeleSift - core/mapper.rs
//
// Column mapping: positional zip of an extracted value list onto a fixed
// number of slots. Always total; shortfalls pad with null and surplus
// values are dropped.

use crate::core::model::FieldValues;

/// Map `values` onto exactly `slots` cells.
///
/// Slot i receives value i when present, otherwise null. A missing family
/// (`None`) yields `slots` nulls.
pub fn map_family(values: Option<&FieldValues>, slots: usize) -> Vec<Option<String>> {
    let Some(values) = values else {
        return vec![None; slots];
    };

    if values.len() != slots {
        tracing::trace!(
            expected = slots,
            actual = values.len(),
            "Value count differs from slot count; padding/truncating"
        );
    }

    (0..slots)
        .map(|i| values.get(i).map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn map_values(values: &[String], slots: usize) -> Vec<Option<String>> {
        map_family(Some(&FieldValues::Numeric(values.to_vec())), slots)
    }

    #[test]
    fn test_exact_fit() {
        let out = map_values(&strings(&["1", "2", "3"]), 3);
        assert_eq!(out, vec![Some("1".into()), Some("2".into()), Some("3".into())]);
    }

    #[test]
    fn test_padding_when_short() {
        let out = map_values(&strings(&["1"]), 4);
        assert_eq!(out, vec![Some("1".into()), None, None, None]);
    }

    #[test]
    fn test_truncation_when_long() {
        let out = map_values(&strings(&["1", "2", "3", "4", "5"]), 2);
        assert_eq!(out, vec![Some("1".into()), Some("2".into())]);
    }

    #[test]
    fn test_mapping_is_total_for_all_lengths() {
        for k in 0..8 {
            let values: Vec<String> = (0..k).map(|i| i.to_string()).collect();
            for n in 0..8 {
                let out = map_family(Some(&FieldValues::Numeric(values.clone())), n);
                assert_eq!(out.len(), n);
                let filled = out.iter().filter(|c| c.is_some()).count();
                assert_eq!(filled, k.min(n));
                assert!(out[..filled].iter().all(Option::is_some));
            }
        }
    }

    #[test]
    fn test_missing_family_is_all_null() {
        assert_eq!(map_family(None, 3), vec![None, None, None]);
    }

    #[test]
    fn test_tokens_map_positionally() {
        let tokens = FieldValues::Tokens(strings(&["lck", "lc"]));
        assert_eq!(
            map_family(Some(&tokens), 4),
            vec![Some("lck".into()), Some("lc".into()), None, None]
        );
    }

    #[test]
    fn test_text_occupies_first_slot() {
        let text = FieldValues::Text("lost lock".into());
        assert_eq!(map_family(Some(&text), 1), vec![Some("lost lock".into())]);
        assert_eq!(map_family(Some(&text), 0), Vec::<Option<String>>::new());
    }
}
