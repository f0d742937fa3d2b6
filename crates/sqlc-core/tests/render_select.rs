//! Tests for SELECT rendering.

mod common;
use common::*;

use sqlc_core::field::{func, FieldKind, Int, Text};
use sqlc_core::{select, select_all, select_count, Dialect, SqlValue, Table};

#[test]
fn test_where_by_id() {
    let t = Table::new("T");
    let id = t.column::<Int>("id").unwrap();
    let stmt = select_all().from(&t).where_clause([id.eq(3)]).into_statement();
    let (sql, params) = render_with(&stmt, Dialect::Sqlite, "alias").into_parts();
    assert_eq!(sql, "SELECT * FROM T WHERE T.id = ?");
    assert_eq!(params, [SqlValue::Int(3)]);
}

#[test]
fn test_placeholders_follow_condition_order() {
    let books = Books::new();
    let stmt = select_all()
        .from(&books.table)
        .where_clause([
            books.pages.gt(100),
            books.title.eq("Dune"),
            books.id.le(50),
            books.author_id.is_in([4, 5]).unwrap(),
        ])
        .into_statement();
    let rendered = render_with(&stmt, Dialect::Sqlite, "alias");
    assert_eq!(
        rendered.sql(),
        "SELECT * FROM books WHERE books.pages > ? AND books.title = ? \
         AND books.id <= ? AND books.author_id IN (?, ?)"
    );
    assert_eq!(
        rendered.params(),
        &[
            SqlValue::Int64(100),
            SqlValue::Text(String::from("Dune")),
            SqlValue::Int(50),
            SqlValue::Int(4),
            SqlValue::Int(5),
        ]
    );
    assert_eq!(count_placeholders(rendered.sql()), rendered.params().len());
}

#[test]
fn test_postgres_placeholders_are_numbered_in_text_order() {
    let books = Books::new();
    let stmt = select_all()
        .from(&books.table)
        .where_clause([books.id.ge(1), books.id.lt(9)])
        .into_statement();
    let rendered = render_with(&stmt, Dialect::Postgres, "alias");
    assert_eq!(
        rendered.sql(),
        "SELECT * FROM books WHERE books.id >= $1 AND books.id < $2"
    );
}

#[test]
fn test_projection_is_qualified() {
    let books = Books::new();
    let stmt = select(&[&books.id, &books.title])
        .from(&books.table)
        .into_statement();
    assert_eq!(sql(&stmt), "SELECT books.id, books.title FROM books");
}

#[test]
fn test_aliased_table_qualifies_by_alias() {
    let b = Books::aliased("b");
    let stmt = select(&[&b.title])
        .from(&b.table)
        .where_clause([b.id.eq(1)])
        .into_statement();
    assert_eq!(sql(&stmt), "SELECT b.title FROM books AS b WHERE b.id = ?");
}

#[test]
fn test_scope_alias_applies_to_columns_of_the_bare_table() {
    let books = Books::new();
    let b = books.table.aliased("b");
    let stmt = select(&[&books.title]).from(&b).into_statement();
    assert_eq!(sql(&stmt), "SELECT b.title FROM books AS b");
}

#[test]
fn test_field_alias_applies_when_the_source_has_none() {
    let books = Books::new();
    let title = books.title.aliased("x");
    let stmt = select(&[&title]).from(&books.table).into_statement();
    assert_eq!(sql(&stmt), "SELECT x.title FROM books");
}

#[test]
fn test_unowned_fields_render_bare() {
    let books = Books::new();
    let n = sqlc_core::field::Column::<Int>::new("n");
    let stmt = select(&[&n]).from(&books.table).into_statement();
    assert_eq!(sql(&stmt), "SELECT n FROM books");
}

#[test]
fn test_join_with_two_conditions_is_parenthesized() {
    let a = Table::new("a");
    let b = Table::new("b");
    let stmt = select_all()
        .from(&a)
        .join(&b)
        .on([
            a.column::<Int>("x").unwrap().eq_col(&b.column::<Int>("y").unwrap()),
            a.column::<Int>("z").unwrap().eq_col(&b.column::<Int>("w").unwrap()),
        ])
        .unwrap()
        .into_statement();
    assert_eq!(sql(&stmt), "SELECT * FROM a JOIN b ON (a.x = b.y AND a.z = b.w)");
}

#[test]
fn test_joins_render_in_declaration_order() {
    let books = Books::new();
    let authors = Authors::new();
    let editors = Table::new("editors").aliased("e");
    let stmt = select(&[&books.title, &authors.name])
        .from(&books.table)
        .join(&authors.table)
        .on([books.author_id.eq_col(&authors.id)])
        .unwrap()
        .left_outer_join(&editors)
        .on([editors.column::<Int>("book_id").unwrap().eq_col(&books.id)])
        .unwrap()
        .where_clause([authors.name.eq("Le Guin")])
        .into_statement();
    assert_eq!(
        sql(&stmt),
        "SELECT books.title, authors.name FROM books \
         JOIN authors ON books.author_id = authors.id \
         LEFT OUTER JOIN editors AS e ON e.book_id = books.id \
         WHERE authors.name = ?"
    );
}

#[test]
fn test_anonymous_subquery_gets_generated_alias() {
    let books = Books::new();
    let inner = select(&[&books.id, &books.title])
        .from(&books.table)
        .where_clause([books.pages.gt(300)])
        .into_subquery();
    let title = inner.field("title").unwrap();
    let stmt = select(&[&title])
        .from(&inner)
        .where_clause([inner.column::<Int>("id").unwrap().lt(10)])
        .into_statement();
    let rendered = render_with(&stmt, Dialect::Sqlite, "sub");
    assert_eq!(
        rendered.sql(),
        "SELECT sub_1.title FROM (SELECT books.id, books.title FROM books \
         WHERE books.pages > ?) AS sub_1 WHERE sub_1.id < ?"
    );
    assert_eq!(rendered.params(), &[SqlValue::Int64(300), SqlValue::Int(10)]);
}

#[test]
fn test_nested_subqueries_each_get_an_alias() {
    let books = Books::new();
    let innermost = select_all().from(&books.table).into_subquery();
    let middle = select_all().from(&innermost).into_subquery();
    let stmt = select_all().from(&middle).into_statement();
    assert_eq!(
        render_with(&stmt, Dialect::Sqlite, "q").sql(),
        "SELECT * FROM (SELECT * FROM (SELECT * FROM books) AS q_2) AS q_1"
    );
}

#[test]
fn test_star_subquery_exposes_source_columns() {
    let books = Books::new();
    let inner = select_all().from(&books.table).aliased("all_books").into_subquery();
    let pages = inner.field("pages").unwrap();
    let stmt = select(&[&pages]).from(&inner).into_statement();
    assert_eq!(
        sql(&stmt),
        "SELECT all_books.pages FROM (SELECT * FROM books) AS all_books"
    );
}

#[test]
fn test_star_subquery_over_a_join_exposes_joined_columns() {
    let books = Books::new();
    let authors = Authors::new();
    let inner = select_all()
        .from(&books.table)
        .join(&authors.table)
        .on([books.author_id.eq_col(&authors.id)])
        .unwrap()
        .aliased("shelf")
        .into_subquery();
    let name = inner.field("name").unwrap();
    assert!(inner.column::<Int>("name").unwrap_err().is_type_mismatch());

    let stmt = select(&[&name]).from(&inner).into_statement();
    assert_eq!(
        sql(&stmt),
        "SELECT shelf.name FROM (SELECT * FROM books \
         JOIN authors ON books.author_id = authors.id) AS shelf"
    );
}

#[test]
fn test_derived_columns_of_a_subquery_are_labelled() {
    let books = Books::new();
    let inner = select(&[&books.author_id, &func::count(&books.id)])
        .from(&books.table)
        .group_by(&[&books.author_id])
        .aliased("per_author")
        .into_subquery();
    let n = inner.field("count").unwrap();
    let stmt = select_all()
        .from(&inner)
        .where_clause([n.compare(sqlc_core::Predicate::Gt, 2_i64).unwrap()])
        .into_statement();
    assert_eq!(
        sql(&stmt),
        "SELECT * FROM (SELECT books.author_id, COUNT(books.id) AS count FROM books \
         GROUP BY books.author_id) AS per_author WHERE per_author.count > ?"
    );
}

#[test]
fn test_joined_subquery_is_qualified_in_on() {
    let books = Books::new();
    let authors = Authors::new();
    let prolific = select(&[&books.author_id])
        .from(&books.table)
        .where_clause([books.pages.gt(1000)])
        .into_subquery();
    let stmt = select(&[&authors.name])
        .from(&authors.table)
        .join(&prolific)
        .on([authors.id.eq_col(&prolific.column::<Int>("author_id").unwrap())])
        .unwrap()
        .into_statement();
    let rendered = render_with(&stmt, Dialect::Postgres, "p");
    assert_eq!(
        rendered.sql(),
        "SELECT authors.name FROM authors JOIN (SELECT books.author_id FROM books \
         WHERE books.pages > $1) AS p_1 ON authors.id = p_1.author_id"
    );
}

#[test]
fn test_explicit_alias_renders_identically_every_time() {
    let books = Books::new();
    let inner = select_all()
        .from(&books.table)
        .where_clause([books.title.eq("Emma")])
        .aliased("fixed")
        .into_subquery();
    let stmt = select_all().from(&inner).into_statement();
    let first = sqlc_core::render(&stmt, Dialect::Sqlite).unwrap();
    let second = sqlc_core::render(&stmt, Dialect::Sqlite).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.sql(),
        "SELECT * FROM (SELECT * FROM books WHERE books.title = ?) AS fixed"
    );
}

#[test]
fn test_anonymous_subquery_gets_a_fresh_alias_per_render() {
    let books = Books::new();
    let inner = select(&[&books.id]).from(&books.table).into_subquery();
    let id = inner.column::<Int>("id").unwrap();
    let stmt = select(&[&id]).from(&inner).into_statement();

    let first = sqlc_core::render(&stmt, Dialect::Sqlite).unwrap();
    let second = sqlc_core::render(&stmt, Dialect::Sqlite).unwrap();
    assert_ne!(first.sql(), second.sql());

    for rendered in [first, second] {
        let alias = rendered
            .sql()
            .rsplit(" AS ")
            .next()
            .unwrap()
            .to_owned();
        assert!(alias.starts_with("alias_"));
        assert!(rendered.sql().starts_with(&format!("SELECT {alias}.id FROM")));
    }
}

#[test]
fn test_count_with_where() {
    let books = Books::new();
    let stmt = select_count()
        .from(&books.table)
        .where_clause([books.author_id.eq(2)])
        .into_statement();
    assert_eq!(sql(&stmt), "SELECT COUNT(*) FROM books WHERE books.author_id = ?");
}

#[test]
fn test_order_by_directions() {
    let books = Books::new();
    let stmt = select(&[&books.title])
        .from(&books.table)
        .order_by_desc(&[&books.published])
        .order_by(&[&books.title])
        .into_statement();
    assert_eq!(
        sql(&stmt),
        "SELECT books.title FROM books ORDER BY books.published DESC, books.title"
    );
}

#[test]
fn test_scalar_functions_nest() {
    let books = Books::new();
    let shout = func::upper(&func::coalesce(&books.title, "untitled"));
    let stmt = select(&[&shout])
        .from(&books.table)
        .where_clause([func::length(&books.title).gt(3)])
        .into_statement();
    let rendered = render_with(&stmt, Dialect::Sqlite, "alias");
    assert_eq!(
        rendered.sql(),
        "SELECT UPPER(COALESCE(books.title, ?)) FROM books WHERE LENGTH(books.title) > ?"
    );
    assert_eq!(
        rendered.params(),
        &[SqlValue::Text(String::from("untitled")), SqlValue::Int64(3)]
    );
}

#[test]
fn test_mysql_and_postgres_quote_differently() {
    let t = Table::new("order");
    let key = t.column::<Text>("key name").unwrap();
    let stmt = select(&[&key]).from(&t).into_statement();
    assert_eq!(
        render_with(&stmt, Dialect::MySql, "alias").sql(),
        "SELECT `order`.`key name` FROM `order`"
    );
    assert_eq!(
        render_with(&stmt, Dialect::Postgres, "alias").sql(),
        "SELECT \"order\".\"key name\" FROM \"order\""
    );
}

#[test]
fn test_reserved_names_are_quoted_wherever_they_qualify() {
    let user = Table::new("user")
        .with_column("id", FieldKind::Int)
        .with_column("group_id", FieldKind::Int);
    let group = Table::new("groups")
        .with_column("id", FieldKind::Int)
        .aliased("group");
    let user_id = user.column::<Int>("id").unwrap();
    let group_id = user.column::<Int>("group_id").unwrap();
    let gid = group.column::<Int>("id").unwrap();

    let stmt = select_all()
        .from(&user)
        .join(&group)
        .on([group_id.eq_col(&gid)])
        .unwrap()
        .where_clause([user_id.eq(1)])
        .into_statement();
    assert_eq!(
        render_with(&stmt, Dialect::Postgres, "alias").sql(),
        "SELECT * FROM \"user\" JOIN groups AS \"group\" \
         ON \"user\".group_id = \"group\".id WHERE \"user\".id = $1"
    );

    let inner = select(&[&user_id]).from(&user).aliased("order").into_subquery();
    let id = inner.column::<Int>("id").unwrap();
    let stmt = select(&[&id]).from(&inner).into_statement();
    assert_eq!(
        render_with(&stmt, Dialect::MySql, "alias").sql(),
        "SELECT `order`.id FROM (SELECT `user`.id FROM `user`) AS `order`"
    );
}
