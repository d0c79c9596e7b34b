//! Boolean groupings (`$and`, `$or`, `$nor`, `$all`) and their flattening into
//! the nested-array selector shape.
//!
//! A group is flattened into `{"$op": [...]}` where the array holds, in order:
//! every filter as `{field: value}`, every condition as `{"$op": operand}`, and
//! finally every child group flattened the same way. The three passes never
//! interleave, whatever order the caller added things in.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde_json::{Map, Value};

use crate::condition::Condition;
use crate::error::BuildResult;

/// Operator tag of a combination node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinationOperator {
    /// Matches if all the selectors in the array match.
    And,
    /// Matches if any of the selectors in the array match.
    Or,
    /// Matches if none of the selectors in the array match.
    Nor,
    /// Matches an array value if it contains all the elements of the argument array.
    All,
}

impl CombinationOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            CombinationOperator::And => "$and",
            CombinationOperator::Or => "$or",
            CombinationOperator::Nor => "$nor",
            CombinationOperator::All => "$all",
        }
    }
}

impl fmt::Display for CombinationOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CombinationOperator {
    type Err = String;

    /// Accepts `and`, `$and`, `AND` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix('$').unwrap_or(s);
        match name.to_ascii_lowercase().as_str() {
            "and" => Ok(CombinationOperator::And),
            "or" => Ok(CombinationOperator::Or),
            "nor" => Ok(CombinationOperator::Nor),
            "all" => Ok(CombinationOperator::All),
            _ => Err(format!("unknown combination operator '{}'", s)),
        }
    }
}

/// A direct `field == value` constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn new<V: Into<Value>>(field: impl Into<String>, value: V) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `{field: value}`
    fn to_entry(&self) -> Value {
        let mut entry = Map::new();
        entry.insert(self.field.clone(), self.value.clone());
        Value::Object(entry)
    }
}

/// One argument to `add_combination`: either a filter or a typed condition.
#[derive(Debug, Clone, PartialEq)]
pub enum CombinationItem {
    Filter(Filter),
    Condition(Condition),
}

impl From<Filter> for CombinationItem {
    fn from(filter: Filter) -> Self {
        CombinationItem::Filter(filter)
    }
}

impl From<Condition> for CombinationItem {
    fn from(condition: Condition) -> Self {
        CombinationItem::Condition(condition)
    }
}

/// A node of a combination tree. Nodes own their children and are append-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    operator: CombinationOperator,
    filters: Vec<Filter>,
    conditions: Vec<Condition>,
    children: Vec<Combination>,
}

impl Combination {
    /// Creates a detached node, partitioning `items` into filters and conditions.
    pub(crate) fn from_items<I, T>(operator: CombinationOperator, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<CombinationItem>,
    {
        let mut combination = Combination {
            operator,
            filters: Vec::new(),
            conditions: Vec::new(),
            children: Vec::new(),
        };
        for item in items {
            combination.push_item(item.into());
        }
        combination
    }

    fn push_item(&mut self, item: CombinationItem) {
        match item {
            CombinationItem::Filter(filter) => self.filters.push(filter),
            CombinationItem::Condition(condition) => self.conditions.push(condition),
        }
    }

    /// Nests a new group under this one and returns it for further nesting.
    pub fn add_combination<I, T>(&mut self, operator: CombinationOperator, items: I) -> &mut Combination
    where
        I: IntoIterator<Item = T>,
        T: Into<CombinationItem>,
    {
        self.children.push(Combination::from_items(operator, items));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn add_filter<V: Into<Value>>(&mut self, field: impl Into<String>, value: V) -> &mut Self {
        self.filters.push(Filter::new(field, value));
        self
    }

    pub fn add_condition(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    pub fn operator(&self) -> CombinationOperator {
        self.operator
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn children(&self) -> &[Combination] {
        &self.children
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Combination> {
        self.children.get_mut(index)
    }

    /// The array this node contributes under its operator key.
    pub fn flatten(&self) -> BuildResult<Vec<Value>> {
        let mut items =
            Vec::with_capacity(self.filters.len() + self.conditions.len() + self.children.len());

        for filter in &self.filters {
            items.push(filter.to_entry());
        }

        for condition in &self.conditions {
            items.push(serde_json::to_value(condition)?);
        }

        if !self.children.is_empty() {
            debug!(
                "flattening {} child combinations under {}",
                self.children.len(),
                self.operator
            );
        }
        for child in &self.children {
            items.push(child.to_selector()?);
        }

        Ok(items)
    }

    /// `{"$op": [...]}`, the form used when nested inside a parent's array.
    pub fn to_selector(&self) -> BuildResult<Value> {
        let mut entry = Map::new();
        entry.insert(self.operator.as_str().to_string(), Value::Array(self.flatten()?));
        Ok(Value::Object(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_parsing() {
        assert_eq!("and".parse::<CombinationOperator>(), Ok(CombinationOperator::And));
        assert_eq!("$or".parse::<CombinationOperator>(), Ok(CombinationOperator::Or));
        assert_eq!("NOR".parse::<CombinationOperator>(), Ok(CombinationOperator::Nor));
        assert_eq!("$All".parse::<CombinationOperator>(), Ok(CombinationOperator::All));
        assert!("xor".parse::<CombinationOperator>().is_err());
    }

    #[test]
    fn test_items_are_partitioned() {
        let combination = Combination::from_items(
            CombinationOperator::And,
            [
                CombinationItem::from(Filter::new("a", 1)),
                CombinationItem::from(Condition::GreaterThan(2)),
                CombinationItem::from(Filter::new("b", "two")),
            ],
        );
        assert_eq!(combination.filters().len(), 2);
        assert_eq!(combination.conditions(), &[Condition::GreaterThan(2)]);
        assert_eq!(combination.filters()[1].field, "b");
        assert!(combination.children().is_empty());
    }

    #[test]
    fn test_flat_group() {
        let combination = Combination::from_items(
            CombinationOperator::Or,
            [Filter::new("id", 5), Filter::new("ids", 10)],
        );
        assert_eq!(
            combination.to_selector().unwrap(),
            json!({"$or": [{"id": 5}, {"ids": 10}]})
        );
    }

    #[test]
    fn test_empty_group() {
        let combination = Combination::from_items(CombinationOperator::Nor, Vec::<Filter>::new());
        assert_eq!(combination.to_selector().unwrap(), json!({"$nor": []}));
    }

    #[test]
    fn test_three_level_tree() {
        let mut root = Combination::from_items(
            CombinationOperator::Or,
            [Filter::new("id", 5), Filter::new("ids", 10)],
        );
        root.add_combination(
            CombinationOperator::And,
            [Filter::new("a", 1), Filter::new("b", 2)],
        )
        .add_combination(
            CombinationOperator::Or,
            [Filter::new("x", 0), Filter::new("x", 100)],
        );

        assert_eq!(
            root.to_selector().unwrap(),
            json!({"$or": [
                {"id": 5},
                {"ids": 10},
                {"$and": [{"a": 1}, {"b": 2}, {"$or": [{"x": 0}, {"x": 100}]}]}
            ]})
        );
    }

    #[test]
    fn test_filters_precede_children_regardless_of_call_order() {
        let mut root = Combination::from_items(CombinationOperator::And, Vec::<Filter>::new());
        {
            let middle = root.add_combination(CombinationOperator::Or, Vec::<Filter>::new());
            middle.add_combination(CombinationOperator::Nor, [Filter::new("deep", true)]);
            middle.add_filter("m", 1);
        }
        root.add_filter("r1", 1);
        root.add_combination(CombinationOperator::All, [Filter::new("tags", json!(["a"]))]);
        root.add_filter("r2", 2);

        assert_eq!(
            root.to_selector().unwrap(),
            json!({"$and": [
                {"r1": 1},
                {"r2": 2},
                {"$or": [{"m": 1}, {"$nor": [{"deep": true}]}]},
                {"$all": [{"tags": ["a"]}]}
            ]})
        );
    }

    #[test]
    fn test_conditions_emitted_between_filters_and_children() {
        let mut root = Combination::from_items(
            CombinationOperator::And,
            [
                CombinationItem::from(Condition::LessThan(9)),
                CombinationItem::from(Filter::new("f", 1)),
            ],
        );
        root.add_combination(CombinationOperator::Or, [Filter::new("c", 3)]);
        root.add_condition(Condition::Exists(true));

        assert_eq!(
            root.flatten().unwrap(),
            vec![
                json!({"f": 1}),
                json!({"$lt": 9}),
                json!({"$exists": true}),
                json!({"$or": [{"c": 3}]}),
            ]
        );
    }

    #[test]
    fn test_child_mut_walks_existing_children() {
        let mut root = Combination::from_items(CombinationOperator::And, [Filter::new("a", 1)]);
        root.add_combination(CombinationOperator::Or, [Filter::new("b", 2)]);
        root.child_mut(0).unwrap().add_filter("c", 3);
        assert!(root.child_mut(1).is_none());
        assert_eq!(root.children()[0].filters().len(), 2);
    }
}
