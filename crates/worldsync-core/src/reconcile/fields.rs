//! Typed field descriptors driving the item diff.
//!
//! Each persisted item column that reconciliation may rewrite has one
//! [`FieldSpec`] naming the column, how to read it from the local and
//! persisted forms, and which group it belongs to. The item reconciler loops
//! over [`FIELDS`] generically instead of hand-writing each comparison.

use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, Value};
use std::fmt;

use crate::catalog::LocalItem;
use crate::db::store::ItemRecord;

/// Which reconciliation group a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    /// Bookkeeping fields, reconciled unconditionally.
    Always,
    /// Gameplay-authoring fields, skipped when `override_item_data` is set.
    OverrideProtected,
}

/// A comparable column value.
///
/// `Null` only appears on the persisted side, for an `item_category` that
/// was stored without a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Null => f.write_str("null"),
        }
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Int(value) => value.to_sql(),
            Self::Text(value) => value.to_sql(),
            Self::Null => Ok(ToSqlOutput::Owned(Value::Null)),
        }
    }
}

/// The local item plus run-scoped context the plain item struct lacks.
#[derive(Debug, Clone, Copy)]
pub struct LocalItemState<'a> {
    pub item: &'a LocalItem,
    /// Current digest of the item's texture, from the resolved asset set.
    pub texture_hash: &'a str,
    /// Persisted category code from the classifier; `None` is an anomaly.
    pub category_code: Option<i16>,
}

/// Descriptor for one reconciled column.
pub struct FieldSpec {
    /// Store column name; static, never derived from input.
    pub column: &'static str,
    pub group: FieldGroup,
    /// Read the desired value from local state. `None` means the value is
    /// unavailable (unmapped category): log an anomaly and skip the field.
    pub local: fn(&LocalItemState<'_>) -> Option<FieldValue>,
    /// Read the currently persisted value.
    pub persisted: fn(&ItemRecord) -> FieldValue,
}

/// All reconciled columns, bookkeeping group first.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        column: "texture_hash",
        group: FieldGroup::Always,
        local: |state| Some(FieldValue::Text(state.texture_hash.to_string())),
        persisted: |record| FieldValue::Text(record.texture_hash.clone()),
    },
    FieldSpec {
        column: "name",
        group: FieldGroup::Always,
        local: |state| Some(FieldValue::Text(state.item.name.clone())),
        persisted: |record| FieldValue::Text(record.name.clone()),
    },
    FieldSpec {
        column: "max_amount",
        group: FieldGroup::Always,
        local: |state| Some(FieldValue::Int(i64::from(state.item.max_amount))),
        persisted: |record| FieldValue::Int(i64::from(record.max_amount)),
    },
    FieldSpec {
        column: "rarity",
        group: FieldGroup::Always,
        local: |state| Some(FieldValue::Int(i64::from(state.item.rarity))),
        persisted: |record| FieldValue::Int(i64::from(record.rarity)),
    },
    FieldSpec {
        column: "item_category",
        group: FieldGroup::Always,
        local: |state| state.category_code.map(|code| FieldValue::Int(i64::from(code))),
        persisted: |record| {
            record
                .item_category
                .map_or(FieldValue::Null, |code| FieldValue::Int(i64::from(code)))
        },
    },
    FieldSpec {
        column: "break_hits",
        group: FieldGroup::Always,
        local: |state| Some(FieldValue::Int(i64::from(state.item.break_hits))),
        persisted: |record| FieldValue::Int(i64::from(record.break_hits)),
    },
    FieldSpec {
        column: "collision_type",
        group: FieldGroup::Always,
        local: |state| Some(FieldValue::Int(i64::from(state.item.collision_type))),
        persisted: |record| FieldValue::Int(i64::from(record.collision_type)),
    },
    FieldSpec {
        column: "action_type",
        group: FieldGroup::OverrideProtected,
        local: |state| Some(FieldValue::Int(i64::from(state.item.action_type))),
        persisted: |record| FieldValue::Int(i64::from(record.action_type)),
    },
    FieldSpec {
        column: "texture",
        group: FieldGroup::OverrideProtected,
        local: |state| Some(FieldValue::Text(state.item.texture.clone())),
        persisted: |record| FieldValue::Text(record.texture.clone()),
    },
    FieldSpec {
        column: "texture_x",
        group: FieldGroup::OverrideProtected,
        local: |state| Some(FieldValue::Int(i64::from(state.item.texture_x))),
        persisted: |record| FieldValue::Int(i64::from(record.texture_x)),
    },
    FieldSpec {
        column: "texture_y",
        group: FieldGroup::OverrideProtected,
        local: |state| Some(FieldValue::Int(i64::from(state.item.texture_y))),
        persisted: |record| FieldValue::Int(i64::from(record.texture_y)),
    },
    FieldSpec {
        column: "spread_type",
        group: FieldGroup::OverrideProtected,
        local: |state| Some(FieldValue::Int(i64::from(state.item.spread_type))),
        persisted: |record| FieldValue::Int(i64::from(record.spread_type)),
    },
];

#[cfg(test)]
mod tests {
    use super::{FIELDS, FieldGroup};
    use std::collections::HashSet;

    #[test]
    fn columns_are_unique() {
        let mut seen = HashSet::new();
        for spec in FIELDS {
            assert!(seen.insert(spec.column), "duplicate column {}", spec.column);
        }
    }

    #[test]
    fn group_membership_matches_the_override_contract() {
        let protected: HashSet<&str> = FIELDS
            .iter()
            .filter(|spec| spec.group == FieldGroup::OverrideProtected)
            .map(|spec| spec.column)
            .collect();
        let expected: HashSet<&str> =
            ["action_type", "texture", "texture_x", "texture_y", "spread_type"]
                .into_iter()
                .collect();
        assert_eq!(protected, expected);
    }

    #[test]
    fn bookkeeping_group_always_flows() {
        let always: Vec<&str> = FIELDS
            .iter()
            .filter(|spec| spec.group == FieldGroup::Always)
            .map(|spec| spec.column)
            .collect();
        assert_eq!(
            always,
            [
                "texture_hash",
                "name",
                "max_amount",
                "rarity",
                "item_category",
                "break_hits",
                "collision_type"
            ]
        );
    }
}
