//! Reference evaluator
//!
//! Turns cohort definitions into patient-membership sets and report
//! definitions into count tables, against the in-memory store. This is the
//! stand-in for the host reporting engine's evaluation capability; the
//! semantics follow the definitions exactly, including the lenient
//! parameter-mapping resolution described in [`EvaluationContext::child`].

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use pecg_defs::{
    CohortDefinition, CohortIndicator, CohortKind, CompositionCohort, ExpressionToken,
    IndicatorDataSetDefinition, ReportDefinition, tokenize_expression,
};

use crate::{
    ClinicalStore, EnrollmentVisitQuery, EvalError, EvalResult, EvaluationContext, ON_OR_AFTER,
    ON_OR_BEFORE, Sex,
};

/// Reference-date parameter read by age cohorts
pub const EFFECTIVE_DATE: &str = "effectiveDate";

/// A set of matching patient identifiers
pub type PatientSet = BTreeSet<i32>;

/// Evaluate a cohort definition to the set of matching patients
pub fn evaluate_cohort(
    store: &ClinicalStore,
    definition: &CohortDefinition,
    ctx: &EvaluationContext,
) -> EvalResult<PatientSet> {
    match &definition.kind {
        CohortKind::Age(age) => {
            let effective_date = ctx.date(EFFECTIVE_DATE)?;
            Ok(store
                .patients()
                .iter()
                .filter(|patient| !patient.voided)
                .filter(|patient| match patient.age_at(effective_date) {
                    Some(years) => {
                        age.min_age.is_none_or(|min| years >= min)
                            && age.max_age.is_none_or(|max| years <= max)
                    }
                    None => false,
                })
                .map(|patient| patient.patient_id)
                .collect())
        }
        CohortKind::Sex(sex) => Ok(store
            .patients()
            .iter()
            .filter(|patient| !patient.voided)
            .filter(|patient| match patient.sex {
                Some(Sex::Male) => sex.male_included,
                Some(Sex::Female) => sex.female_included,
                None => false,
            })
            .map(|patient| patient.patient_id)
            .collect()),
        CohortKind::Sql(sql) => {
            let query = EnrollmentVisitQuery::parse(&sql.query)
                .ok_or_else(|| EvalError::unsupported_query(&definition.name))?;
            let on_or_after = ctx.date(ON_OR_AFTER)?;
            let on_or_before = ctx.date(ON_OR_BEFORE)?;
            Ok(query.evaluate(store, on_or_after, on_or_before))
        }
        CohortKind::Composition(composition) => evaluate_composition(store, composition, ctx),
    }
}

/// Evaluate an indicator to the set of patients it counts
pub fn evaluate_indicator(
    store: &ClinicalStore,
    indicator: &CohortIndicator,
    ctx: &EvaluationContext,
) -> EvalResult<PatientSet> {
    let cohort_ctx = ctx.child(&indicator.cohort.mappings);
    evaluate_cohort(store, &indicator.cohort.inner, &cohort_ctx)
}

/// One evaluated dataset column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetCell {
    /// Column key
    pub key: String,
    /// Column label
    pub label: String,
    /// Number of matching patients
    pub count: usize,
}

/// One evaluated dataset, columns in definition order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetResult {
    /// Dataset name
    pub name: String,
    /// Evaluated columns
    pub columns: Vec<DataSetCell>,
}

/// A fully evaluated report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResult {
    /// Report name
    pub report_name: String,
    /// Size of the base population the columns were counted within
    pub base_cohort_size: usize,
    /// Evaluated datasets in definition order
    pub datasets: Vec<DataSetResult>,
}

/// Evaluate a dataset, counting each column within the base population
pub fn evaluate_dataset(
    store: &ClinicalStore,
    dataset: &IndicatorDataSetDefinition,
    ctx: &EvaluationContext,
    base: &PatientSet,
) -> EvalResult<DataSetResult> {
    let mut columns = Vec::with_capacity(dataset.columns().len());
    for column in dataset.columns() {
        let indicator_ctx = ctx.child(&column.indicator.mappings);
        let matched = evaluate_indicator(store, &column.indicator.inner, &indicator_ctx)?;
        let count = matched.intersection(base).count();
        debug!("column {} -> {}", column.key, count);
        columns.push(DataSetCell {
            key: column.key.clone(),
            label: column.label.clone(),
            count,
        });
    }
    Ok(DataSetResult {
        name: dataset.name.clone(),
        columns,
    })
}

/// Run a report: evaluate the base population, then every dataset within it
pub fn run_report(
    store: &ClinicalStore,
    report: &ReportDefinition,
    ctx: &EvaluationContext,
) -> EvalResult<ReportResult> {
    let base = match &report.base_cohort {
        Some(mapped) => {
            let base_ctx = ctx.child(&mapped.mappings);
            evaluate_cohort(store, &mapped.inner, &base_ctx)?
        }
        None => store.patient_universe(),
    };
    info!("report '{}': base population {}", report.name, base.len());

    let mut datasets = Vec::with_capacity(report.datasets.len());
    for mapped in &report.datasets {
        let dataset_ctx = ctx.child(&mapped.mappings);
        datasets.push(evaluate_dataset(store, &mapped.inner, &dataset_ctx, &base)?);
    }
    Ok(ReportResult {
        report_name: report.name.clone(),
        base_cohort_size: base.len(),
        datasets,
    })
}

// Composition expressions: `or` binds loosest, then `and`, then `not` and
// parentheses. `not` complements against the unvoided patient universe.

enum ExprNode {
    Key(String),
    And(Box<ExprNode>, Box<ExprNode>),
    Or(Box<ExprNode>, Box<ExprNode>),
    Not(Box<ExprNode>),
}

struct ExprParser<'a> {
    expression: &'a str,
    tokens: Vec<ExpressionToken>,
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn new(expression: &'a str) -> Self {
        Self {
            expression,
            tokens: tokenize_expression(expression),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> EvalError {
        EvalError::invalid_composition(self.expression, reason)
    }

    fn peek(&self) -> Option<&ExpressionToken> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<ExpressionToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse(mut self) -> EvalResult<ExprNode> {
        let node = self.parse_or()?;
        if self.peek().is_some() {
            return Err(self.error("trailing tokens"));
        }
        Ok(node)
    }

    fn parse_or(&mut self) -> EvalResult<ExprNode> {
        let mut node = self.parse_and()?;
        while matches!(self.peek(), Some(ExpressionToken::Or)) {
            self.advance();
            let rhs = self.parse_and()?;
            node = ExprNode::Or(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> EvalResult<ExprNode> {
        let mut node = self.parse_unary()?;
        while matches!(self.peek(), Some(ExpressionToken::And)) {
            self.advance();
            let rhs = self.parse_unary()?;
            node = ExprNode::And(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_unary(&mut self) -> EvalResult<ExprNode> {
        match self.advance() {
            Some(ExpressionToken::Not) => {
                let operand = self.parse_unary()?;
                Ok(ExprNode::Not(Box::new(operand)))
            }
            Some(ExpressionToken::Open) => {
                let node = self.parse_or()?;
                match self.advance() {
                    Some(ExpressionToken::Close) => Ok(node),
                    _ => Err(self.error("unbalanced parenthesis")),
                }
            }
            Some(ExpressionToken::Key(key)) => Ok(ExprNode::Key(key)),
            Some(other) => Err(self.error(format!("unexpected token {:?}", other))),
            None => Err(self.error("empty expression")),
        }
    }
}

fn evaluate_composition(
    store: &ClinicalStore,
    composition: &CompositionCohort,
    ctx: &EvaluationContext,
) -> EvalResult<PatientSet> {
    let node = ExprParser::new(&composition.expression).parse()?;
    evaluate_node(store, composition, ctx, &node)
}

fn evaluate_node(
    store: &ClinicalStore,
    composition: &CompositionCohort,
    ctx: &EvaluationContext,
    node: &ExprNode,
) -> EvalResult<PatientSet> {
    match node {
        ExprNode::Key(key) => {
            let mapped = composition
                .searches
                .get(key)
                .ok_or_else(|| EvalError::unknown_search_key(key))?;
            let search_ctx = ctx.child(&mapped.mappings);
            evaluate_cohort(store, &mapped.inner, &search_ctx)
        }
        ExprNode::And(lhs, rhs) => {
            let left = evaluate_node(store, composition, ctx, lhs)?;
            let right = evaluate_node(store, composition, ctx, rhs)?;
            Ok(left.intersection(&right).copied().collect())
        }
        ExprNode::Or(lhs, rhs) => {
            let left = evaluate_node(store, composition, ctx, lhs)?;
            let right = evaluate_node(store, composition, ctx, rhs)?;
            Ok(left.union(&right).copied().collect())
        }
        ExprNode::Not(operand) => {
            let matched = evaluate_node(store, composition, ctx, operand)?;
            Ok(store
                .patient_universe()
                .difference(&matched)
                .copied()
                .collect())
        }
    }
}
