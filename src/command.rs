use crate::error::{CommandError, CommandResult};
use crate::row::Row;
use crate::table::{Cursor, Table};

pub const HELP: &str = "\
insert <id> <username> <email>   append a row
select                           print every row
.help                            show this message
.exit                            leave";

// Non-SQL statements like .exit are called “meta-commands”.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Help,
}

impl MetaCommand {
    fn parse(input: &str) -> Option<CommandResult<MetaCommand>> {
        match input {
            ".exit" => Some(Ok(MetaCommand::Exit)),
            ".help" => Some(Ok(MetaCommand::Help)),
            _ => {
                if input.starts_with('.') {
                    Some(Err(CommandError::UnrecognizedMeta(input.to_string())))
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

impl Statement {
    fn parse(input: &str) -> CommandResult<Statement> {
        let mut tokens = input.split_whitespace();
        let keyword = tokens.next().unwrap_or_default();

        if keyword.eq_ignore_ascii_case("insert") {
            let id = tokens.next().ok_or(CommandError::MissingField("id"))?;
            let id: i32 = id
                .parse()
                .map_err(|_| CommandError::InvalidId(id.to_string()))?;
            let username = tokens.next().ok_or(CommandError::MissingField("username"))?;
            let email = tokens.next().ok_or(CommandError::MissingField("email"))?;
            reject_trailing(tokens)?;
            Ok(Statement::Insert(Row::new(id, username, email)))
        } else if keyword.eq_ignore_ascii_case("select") {
            reject_trailing(tokens)?;
            Ok(Statement::Select)
        } else {
            Err(CommandError::UnrecognizedKeyword(input.to_string()))
        }
    }

    /// Runs the statement; a select hands back a cursor for the caller to render.
    pub fn execute<'t>(&self, table: &'t mut Table) -> CommandResult<Executed<'t>> {
        match self {
            Statement::Insert(row) => {
                let index = table.append(row)?;
                Ok(Executed::Inserted { index })
            }
            Statement::Select => Ok(Executed::Selected(table.scan())),
        }
    }
}

fn reject_trailing<'a>(mut tokens: impl Iterator<Item = &'a str>) -> CommandResult<()> {
    match tokens.next() {
        Some(token) => Err(CommandError::UnexpectedToken(token.to_string())),
        None => Ok(()),
    }
}

pub enum Executed<'t> {
    Inserted { index: usize },
    Selected(Cursor<'t>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Meta(MetaCommand),
    Statement(Statement),
}

impl Input {
    /// Parses one trimmed, non-empty input line.
    pub fn parse(input: &str) -> CommandResult<Input> {
        if let Some(meta) = MetaCommand::parse(input) {
            meta.map(Input::Meta)
        } else {
            Statement::parse(input).map(Input::Statement)
        }
    }
}
