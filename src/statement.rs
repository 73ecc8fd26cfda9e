/// SQL front end: parse raw SQL text into statements the dispatcher
/// understands. Statements come straight from `sqlparser` and are passed to
/// tables unmodified, so implementations see the full AST.
use anyhow::{anyhow, Result};
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser as SqlParser;

/// Parse SQL text into a list of statements.
pub fn parse_sql(sql: &str) -> Result<Vec<Statement>> {
    let dialect = PostgreSqlDialect {};
    SqlParser::parse_sql(&dialect, sql).map_err(|e| anyhow!("SQL parse error: {}", e))
}

/// Parse SQL text that must contain exactly one statement.
pub fn parse_single(sql: &str) -> Result<Statement> {
    let mut statements = parse_sql(sql)?;
    if statements.len() != 1 {
        return Err(anyhow!("Expected 1 statement, found {}", statements.len()));
    }
    Ok(statements.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sql_single_statement() {
        let statements = parse_sql("SELECT * FROM messages").unwrap();
        assert_eq!(statements.len(), 1);
        match &statements[0] {
            Statement::Query(_) => {}
            other => panic!("Expected a query, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_sql_multiple_statements() {
        let statements =
            parse_sql("SELECT * FROM a; DELETE FROM b WHERE id = 1").unwrap();
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_parse_single_rejects_multiple() {
        let err = parse_single("SELECT 1; SELECT 2").unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_parse_sql_reports_syntax_errors() {
        let err = parse_sql("SELEC * FORM messages").unwrap_err();
        assert!(err.to_string().contains("SQL parse error"));
    }
}
