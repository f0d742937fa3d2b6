//! Tests for rejected builder steps.

mod common;
use common::*;

use sqlc_core::field::{Field, FieldKind, Int, Int64, Text};
use sqlc_core::{
    insert_into, select, select_all, update, Dialect, Error, JoinCondition, Predicate, SqlValue,
    Table,
};

#[test]
fn test_set_value_type_mismatch_keeps_builder_usable() {
    let books = Books::new();
    let id: &Field = &books.id;

    let rejected = insert_into(&books.table).set_value(id, "abc").unwrap_err();
    assert_eq!(
        rejected.error(),
        &Error::TypeMismatch {
            field: String::from("id"),
            expected: FieldKind::Int,
            found: "text",
        }
    );

    let insert = rejected.into_inner().set_value(id, 1).unwrap();
    let (sql, params) = insert.render(Dialect::Sqlite).into_parts();
    assert_eq!(sql, "INSERT INTO books (id) VALUES (?)");
    assert_eq!(params, [SqlValue::Int(1)]);
}

#[test]
fn test_integer_widths_are_checked_on_the_dynamic_path() {
    let books = Books::new();
    let err = update(&books.table)
        .set_value(&books.pages, 5_i32)
        .unwrap_err();
    assert!(err.error().is_type_mismatch());
}

#[test]
fn test_null_is_accepted_for_any_kind() {
    let books = Books::new();
    let insert = insert_into(&books.table)
        .set_value(&books.title, SqlValue::Null)
        .unwrap();
    assert_eq!(insert.node().bindings()[0].value(), &SqlValue::Null);
}

#[test]
fn test_set_rejects_columns_of_other_tables() {
    let books = Books::new();
    let authors = Authors::new();
    let err = insert_into(&books.table)
        .set(&authors.name, "Ursula")
        .unwrap_err();
    assert!(err.error().is_usage());
    assert!(err.to_string().contains("`name`"));
}

#[test]
fn test_set_rejects_function_fields() {
    let books = Books::new();
    let upper = sqlc_core::field::func::upper(&books.title);
    let err = update(&books.table).set(&upper, "X").unwrap_err();
    assert!(err.error().is_usage());
}

#[test]
fn test_returning_rejects_foreign_column() {
    let books = Books::new();
    let authors = Authors::new();
    let err = insert_into(&books.table)
        .set(&books.title, "Dune")
        .unwrap()
        .returning(&authors.id)
        .unwrap_err();
    assert!(err.error().is_usage());
    assert!(err.into_inner().returning(&books.id).is_ok());
}

#[test]
fn test_on_requires_a_condition() {
    let books = Books::new();
    let authors = Authors::new();
    let rejected = select_all()
        .from(&books.table)
        .join(&authors.table)
        .on(Vec::new())
        .unwrap_err();
    assert_eq!(
        rejected.error().to_string(),
        "invalid usage: ON needs at least one join condition"
    );
}

#[test]
fn test_on_rejects_tables_outside_the_query() {
    let books = Books::new();
    let authors = Authors::new();
    let stores = Table::new("stores");
    let err = select_all()
        .from(&books.table)
        .join(&authors.table)
        .on([stores.column::<Int>("owner_id").unwrap().eq_col(&authors.id)])
        .unwrap_err();
    assert!(err.error().is_usage());
}

#[test]
fn test_on_rejects_joining_the_same_subquery_twice() {
    let books = Books::new();
    let authors = Authors::new();
    let prolific = select(&[&books.author_id])
        .from(&books.table)
        .where_clause([books.pages.gt(1000)])
        .into_subquery();
    let author_id = prolific.column::<Int>("author_id").unwrap();
    let rejected = select_all()
        .from(&authors.table)
        .join(&prolific)
        .on([authors.id.eq_col(&author_id)])
        .unwrap()
        .join(&prolific)
        .on([authors.id.eq_col(&author_id)])
        .unwrap_err();
    assert!(rejected.error().is_usage());
}

#[test]
fn test_columns_are_taken_with_their_declared_kind() {
    let books = Books::new();
    let err = books.table.column::<Text>("pages").unwrap_err();
    assert_eq!(
        err.to_string(),
        "type mismatch on `pages`: expected bigint, got text"
    );
    let pages = books.table.column::<Int64>("pages").unwrap();
    assert_eq!(pages.name(), books.pages.name());
}

#[test]
fn test_dynamic_join_conditions_check_kinds() {
    let books = Books::new();
    let authors = Authors::new();
    let err = JoinCondition::new(&books.title, Predicate::Eq, &authors.id).unwrap_err();
    assert!(err.is_type_mismatch());

    let ok = JoinCondition::new(&books.author_id, Predicate::Eq, &authors.id).unwrap();
    let stmt = select_all()
        .from(&books.table)
        .join(&authors.table)
        .on([ok])
        .unwrap()
        .into_statement();
    assert_eq!(
        sql(&stmt),
        "SELECT * FROM books JOIN authors ON books.author_id = authors.id"
    );
}

#[test]
fn test_empty_in_list_is_rejected() {
    let books = Books::new();
    let err = books.id.is_in(Vec::<i32>::new()).unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn test_rejected_converts_with_question_mark() {
    fn build(books: &Books) -> sqlc_core::Result<String> {
        let insert = insert_into(&books.table).set_value(&books.id, "nope")?;
        Ok(insert.render(Dialect::Sqlite).into_parts().0)
    }
    assert!(build(&Books::new()).unwrap_err().is_type_mismatch());
}

// The following would NOT compile, the staged builder and typed columns
// reject them at build time:
//
// #[test]
// fn test_where_before_from() {
//     let books = Books::new();
//     select_all().where_clause([books.id.eq(1)]);
// }
//
// #[test]
// fn test_text_into_integer_column() {
//     let books = Books::new();
//     insert_into(&books.table).set(&books.id, "abc");
// }
//
// #[test]
// fn test_where_before_set() {
//     let books = Books::new();
//     update(&books.table).where_clause([books.id.eq(1)]);
// }
