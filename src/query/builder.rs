//! Listing query construction
//!
//! Builds a parameterized SELECT over the setup history view from validated
//! criteria. Every caller-supplied literal travels as a bound parameter;
//! nothing from the request is concatenated into the SQL text. The ordering
//! `dx_cycle DESC, org_log ASC` is load-bearing for keyset pagination and is
//! deliberately not configurable.

use super::criteria::FilterCriteria;

/// A single bound query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    /// Placeholder name referenced in the SQL text as `@name`
    pub name: String,
    pub value: ParamValue,
}

/// Typed parameter payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Str(String),
}

/// Executable query description handed to the warehouse collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub sql: String,
    pub params: Vec<QueryParam>,
    /// Row bound already applied in the SQL text, kept for response assembly
    pub limit: u32,
}

/// Build the listing query for the given view and criteria
///
/// Pure function: identical criteria produce an identical descriptor.
/// Filter groups are ANDed; each group mirrors the review UI semantics:
/// exact membership for org_log / engmt_manager / aco_analyst and cycles,
/// OR-of-substring for org_cd. A supplied cursor adds the keyset predicate
/// `dx_cycle < last OR (dx_cycle = last AND org_log > last_org_log)`.
pub fn build(view: &str, criteria: &FilterCriteria) -> QueryDescriptor {
    let mut sql = format!("SELECT * FROM `{}`", view);
    let mut params: Vec<QueryParam> = Vec::new();
    let mut groups: Vec<String> = Vec::new();

    if !criteria.org_logs.is_empty() {
        let placeholders: Vec<String> = criteria
            .org_logs
            .iter()
            .map(|v| bind(&mut params, ParamValue::Str(v.clone())))
            .collect();
        groups.push(format!("org_log IN ({})", placeholders.join(", ")));
    }

    if !criteria.org_codes.is_empty() {
        let conditions: Vec<String> = criteria
            .org_codes
            .iter()
            .map(|v| {
                let placeholder = bind(&mut params, ParamValue::Str(format!("%{}%", v)));
                format!("org_cd LIKE {}", placeholder)
            })
            .collect();
        groups.push(format!("({})", conditions.join(" OR ")));
    }

    if !criteria.cycles.is_empty() {
        let placeholders: Vec<String> = criteria
            .cycles
            .iter()
            .map(|v| bind(&mut params, ParamValue::Int(*v)))
            .collect();
        groups.push(format!("dx_cycle IN ({})", placeholders.join(", ")));
    }

    if !criteria.engagement_managers.is_empty() {
        let placeholders: Vec<String> = criteria
            .engagement_managers
            .iter()
            .map(|v| bind(&mut params, ParamValue::Str(v.clone())))
            .collect();
        groups.push(format!("engmt_manager IN ({})", placeholders.join(", ")));
    }

    if !criteria.aco_analysts.is_empty() {
        let placeholders: Vec<String> = criteria
            .aco_analysts
            .iter()
            .map(|v| bind(&mut params, ParamValue::Str(v.clone())))
            .collect();
        groups.push(format!("aco_analyst IN ({})", placeholders.join(", ")));
    }

    if let Some(cursor) = &criteria.cursor {
        let cycle = bind(&mut params, ParamValue::Int(cursor.last_cycle));
        let org_log = bind(&mut params, ParamValue::Str(cursor.last_org_log.clone()));
        groups.push(format!(
            "(dx_cycle < {c} OR (dx_cycle = {c} AND org_log > {l}))",
            c = cycle,
            l = org_log
        ));
    }

    if !groups.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&groups.join(" AND "));
    }

    sql.push_str(" ORDER BY dx_cycle DESC, org_log ASC");
    sql.push_str(&format!(" LIMIT {}", criteria.limit));

    QueryDescriptor {
        sql,
        params,
        limit: criteria.limit,
    }
}

/// Neutralize single quotes so a value can be embedded as a SQL string literal
///
/// The builder binds parameters and never calls this; it exists for
/// collaborators that cannot accept bound parameters and must be applied to
/// every literal before embedding.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn bind(params: &mut Vec<QueryParam>, value: ParamValue) -> String {
    let name = format!("p{}", params.len());
    params.push(QueryParam {
        name: name.clone(),
        value,
    });
    format!("@{}", name)
}
