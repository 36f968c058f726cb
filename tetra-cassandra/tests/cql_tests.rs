use pretty_assertions::assert_eq;
use tetra_cassandra::cql;

// ── Identifiers ──────────────────────────────────────────────────

#[test]
fn plain_identifiers_stay_bare() {
    assert_eq!(cql::ident("created_at"), "created_at");
    assert_eq!(cql::ident("_v2"), "_v2");
}

#[test]
fn mixed_case_identifiers_are_quoted() {
    assert_eq!(cql::ident("userId"), "\"userId\"");
    assert_eq!(cql::ident("2fa"), "\"2fa\"");
    assert_eq!(cql::ident("a\"b"), "\"a\"\"b\"");
}

#[test]
fn keyspace_qualified_tables_quote_each_part() {
    assert_eq!(cql::table("app.users"), "app.users");
    assert_eq!(cql::table("App.users"), "\"App\".users");
}

// ── Statements ───────────────────────────────────────────────────

#[test]
fn select_with_columns_and_predicate() {
    let stmt = cql::select("users")
        .columns(&["id", "name", "age"])
        .where_eq("id")
        .to_cql();
    assert_eq!(stmt, "SELECT id, name, age FROM users WHERE id = ?");
}

#[test]
fn select_star_with_limit_and_filtering() {
    let stmt = cql::select("app.users")
        .where_eq("age")
        .where_eq("active")
        .limit(10)
        .allow_filtering()
        .to_cql();
    assert_eq!(
        stmt,
        "SELECT * FROM app.users WHERE age = ? AND active = ? LIMIT 10 ALLOW FILTERING"
    );
}

#[test]
fn insert_has_one_marker_per_column() {
    let stmt = cql::insert("users").columns(&["id", "name"]).to_cql();
    assert_eq!(stmt, "INSERT INTO users (id, name) VALUES (?, ?)");
}

#[test]
fn delete_by_key() {
    let stmt = cql::delete("users").where_eq("id").to_cql();
    assert_eq!(stmt, "DELETE FROM users WHERE id = ?");
}
