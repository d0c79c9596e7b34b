//! Shell commands and how each one acts on a `QueryBuilder`.

use std::fmt;

use serde_json::Value;

use crate::combination::{CombinationItem, CombinationOperator};
use crate::condition::Condition;
use crate::error::BuildError;
use crate::query_builder::QueryBuilder;

pub const HELP: &str = r#"commands:
  doctype <name>                       set the document type
  field <name>...                      add projected fields
  filter <field> <json>                add field == value to the selector
  cond <field> <op> <json>             add a condition (gt gte lt lte eq neq exists size in type regex mod)
  sort <field> <direction>             add a sort entry
  limit <n> | skip <n>                 set paging
  group <and|or|nor|all> [@i.j] <item>...
                                       add a group at the root, or under the group at path i.j;
                                       items are field=<json> filters or $op=<json> conditions
  build | pretty                       print the query
  reset                                start over
  help | exit"#;

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    DocType(String),
    Fields(Vec<String>),
    Filter { field: String, value: Value },
    Condition { field: String, condition: Condition },
    Sort { field: String, direction: String },
    Limit(i64),
    Skip(i64),
    Group {
        operator: CombinationOperator,
        /// `None` adds a root group
        parent: Option<Vec<usize>>,
        items: Vec<CombinationItem>,
    },
    Build,
    Pretty,
    Reset,
    Help,
    Exit,
}

/// What the shell should do after a command ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Updated,
    Output(String),
    Exit,
}

#[derive(Debug)]
pub enum CommandError {
    UnknownGroup(Vec<usize>),
    Build(BuildError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownGroup(path) => {
                let path: Vec<String> = path.iter().map(|i| i.to_string()).collect();
                write!(f, "no group at @{}", path.join("."))
            }
            CommandError::Build(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<BuildError> for CommandError {
    fn from(e: BuildError) -> Self {
        CommandError::Build(e)
    }
}

impl Command {
    pub fn apply(self, builder: &mut QueryBuilder) -> Result<Outcome, CommandError> {
        match self {
            Command::DocType(name) => {
                builder.set_doc_type(name);
            }
            Command::Fields(fields) => {
                builder.add_fields(fields);
            }
            Command::Filter { field, value } => {
                builder.add_filter(field, value);
            }
            Command::Condition { field, condition } => {
                builder.add_condition(field, condition);
            }
            Command::Sort { field, direction } => {
                builder.add_sort(field, &direction);
            }
            Command::Limit(n) => {
                builder.set_limit(n);
            }
            Command::Skip(n) => {
                builder.set_skip(n);
            }
            Command::Group { operator, parent: None, items } => {
                builder.add_combination(operator, items);
            }
            Command::Group { operator, parent: Some(path), items } => {
                match builder.combination_mut(&path) {
                    Some(parent) => {
                        parent.add_combination(operator, items);
                    }
                    None => return Err(CommandError::UnknownGroup(path)),
                }
            }
            Command::Build => return Ok(Outcome::Output(builder.build_json()?)),
            Command::Pretty => return Ok(Outcome::Output(builder.build()?.to_json_pretty()?)),
            Command::Reset => {
                let config = builder.config().clone();
                *builder = QueryBuilder::from_config(&config);
            }
            Command::Help => return Ok(Outcome::Output(HELP.to_string())),
            Command::Exit => return Ok(Outcome::Exit),
        }
        Ok(Outcome::Updated)
    }
}
