//! Point queries over the enriched dataset.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use thiserror::Error;

use crate::enrich::{EnrichedRow, Period};
use crate::utils::{parse_date, DATE_FORMAT};

/// Selector value meaning "nothing chosen yet".
pub const SELECT_PLACEHOLDER: &str = "— Selecione —";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("no value selected for {0}")]
    MissingSelection(&'static str),
    #[error("invalid date '{0}', expected YYYY-MM-DD or DD/MM/YYYY")]
    InvalidDate(String),
    #[error("invalid period '{0}', expected Diurno or Noturno")]
    InvalidPeriod(String),
}

/// Period restriction. `Outro` can't be selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PeriodFilter {
    #[default]
    Any,
    Diurno,
    Noturno,
}

impl PeriodFilter {
    /// Values offered by the period selector, after the placeholder.
    pub const CHOICES: [&'static str; 2] = ["Diurno", "Noturno"];

    pub fn matches(&self, period: Period) -> bool {
        match self {
            Self::Any => true,
            Self::Diurno => period == Period::Diurno,
            Self::Noturno => period == Period::Noturno,
        }
    }

    fn from_selection(value: Option<&str>) -> Result<Self, QueryError> {
        match selected(value) {
            None => Ok(Self::Any),
            Some("Diurno") => Ok(Self::Diurno),
            Some("Noturno") => Ok(Self::Noturno),
            Some(other) => Err(QueryError::InvalidPeriod(other.to_string())),
        }
    }
}

/// Raw selector values as chosen by the user. `None`, blank and the
/// placeholder all mean "not chosen".
#[derive(Debug, Clone, Default)]
pub struct Selections {
    pub rodovia: Option<String>,
    pub tipo: Option<String>,
    pub data: Option<String>,
    pub sentido: Option<String>,
    pub executor: Option<String>,
    pub periodo: Option<String>,
}

/// A complete filter: all five mandatory fields plus an optional period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCriteria {
    pub rodovia: String,
    pub tipo: String,
    pub data: NaiveDate,
    pub sentido: String,
    pub executor: String,
    pub periodo: PeriodFilter,
}

fn selected(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty() && *v != SELECT_PLACEHOLDER)
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, QueryError> {
    selected(value.as_deref())
        .map(str::to_string)
        .ok_or(QueryError::MissingSelection(field))
}

impl QueryCriteria {
    /// Build criteria, refusing until every mandatory field is chosen.
    pub fn from_selections(selections: &Selections) -> Result<Self, QueryError> {
        let rodovia = required(&selections.rodovia, "Rodovia")?;
        let tipo = required(&selections.tipo, "Tipo")?;
        let data = required(&selections.data, "Data")?;
        let sentido = required(&selections.sentido, "Sentido")?;
        let executor = required(&selections.executor, "Executor")?;
        let data = parse_date(&data).ok_or(QueryError::InvalidDate(data))?;

        Ok(Self {
            rodovia,
            tipo,
            data,
            sentido,
            executor,
            periodo: PeriodFilter::from_selection(selections.periodo.as_deref())?,
        })
    }

    pub fn matches(&self, row: &EnrichedRow) -> bool {
        row.row.rodovia == self.rodovia
            && row.row.tipo == self.tipo
            && row.data == Some(self.data)
            && row.row.sentido == self.sentido
            && row.row.executor == self.executor
            && self.periodo.matches(row.periodo)
    }
}

/// How often an intervention number appears in a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterventionCount {
    pub num_interv: String,
    pub count: usize,
}

/// Matching rows in display order, plus intervention-number tallies.
#[derive(Debug, Clone)]
pub struct QueryResult<'a> {
    pub rows: Vec<&'a EnrichedRow>,
    /// Most frequent first; ties in order of first appearance.
    pub counts: Vec<InterventionCount>,
}

impl QueryResult<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Absent values sort after present ones.
fn none_last<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Display order: Rodovia, KM start, KM end, Sentido, Inicio.
pub fn compare_rows(a: &EnrichedRow, b: &EnrichedRow) -> Ordering {
    a.row
        .rodovia
        .cmp(&b.row.rodovia)
        .then_with(|| none_last(a.km_ini_num, b.km_ini_num))
        .then_with(|| none_last(a.km_fim_num, b.km_fim_num))
        .then_with(|| a.row.sentido.cmp(&b.row.sentido))
        .then_with(|| none_last(a.row.inicio, b.row.inicio))
}

/// Tally values, most frequent first, ties by first appearance.
fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<InterventionCount> {
    let mut counts: Vec<InterventionCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(InterventionCount {
                    num_interv: value.to_string(),
                    count: 1,
                });
            }
        }
    }
    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Filter and sort `rows`, then tally intervention numbers.
pub fn run_query<'a>(rows: &'a [EnrichedRow], criteria: &QueryCriteria) -> QueryResult<'a> {
    let mut matched: Vec<&EnrichedRow> = rows.iter().filter(|r| criteria.matches(r)).collect();
    matched.sort_by(|a, b| compare_rows(a, b));

    let counts = value_counts(matched.iter().map(|r| r.row.num_interv.as_str()));
    tracing::debug!(
        "Query matched {} rows, {} distinct interventions",
        matched.len(),
        counts.len()
    );

    QueryResult {
        rows: matched,
        counts,
    }
}

/// Distinct values for each mandatory selector, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub rodovias: Vec<String>,
    pub tipos: Vec<String>,
    pub datas: Vec<NaiveDate>,
    pub sentidos: Vec<String>,
    pub executores: Vec<String>,
}

impl FilterOptions {
    pub fn from_rows(rows: &[EnrichedRow]) -> Self {
        Self {
            rodovias: distinct(rows.iter().map(|r| r.row.rodovia.as_str())),
            tipos: distinct(rows.iter().map(|r| r.row.tipo.as_str())),
            datas: rows
                .iter()
                .filter_map(|r| r.data)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            sentidos: distinct(rows.iter().map(|r| r.row.sentido.as_str())),
            executores: distinct(rows.iter().map(|r| r.row.executor.as_str())),
        }
    }

    /// Date choices rendered as `YYYY-MM-DD`.
    pub fn date_labels(&self) -> Vec<String> {
        self.datas
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Prefix selector choices with the placeholder.
pub fn with_placeholder(options: &[String]) -> Vec<String> {
    std::iter::once(SELECT_PLACEHOLDER.to_string())
        .chain(options.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Intervention;
    use std::collections::BTreeMap;

    fn row(num: &str, trecho: Option<&str>, inicio: &str, sentido: &str) -> EnrichedRow {
        EnrichedRow::from_row(Intervention {
            num_interv: num.to_string(),
            rodovia: "A".to_string(),
            tipo: "Conserva".to_string(),
            inicio: crate::utils::parse_timestamp(inicio),
            data_fim: None,
            sentido: sentido.to_string(),
            trecho: trecho.map(str::to_string),
            executor: "Equipe A".to_string(),
            base: "Semana Atual".to_string(),
            extra: BTreeMap::new(),
        })
    }

    fn criteria(periodo: Option<&str>) -> QueryCriteria {
        QueryCriteria::from_selections(&Selections {
            rodovia: Some("A".into()),
            tipo: Some("Conserva".into()),
            data: Some("2024-05-03".into()),
            sentido: Some("Norte".into()),
            executor: Some("Equipe A".into()),
            periodo: periodo.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn test_absent_km_sorts_last() {
        let rows = vec![
            row("5", Some("5"), "2024-05-03 07:00", "Norte"),
            row("2", Some("2"), "2024-05-03 07:00", "Norte"),
            row("x", None, "2024-05-03 07:00", "Norte"),
        ];
        let result = run_query(&rows, &criteria(None));
        let order: Vec<&str> = result.rows.iter().map(|r| r.row.num_interv.as_str()).collect();
        assert_eq!(order, vec!["2", "5", "x"]);
    }

    #[test]
    fn test_sort_tiebreaks_on_km_end_then_inicio() {
        let rows = vec![
            row("c", Some("1 - 3"), "2024-05-03 07:30", "Norte"),
            row("b", Some("1 - 3"), "2024-05-03 07:00", "Norte"),
            row("a", Some("1 - 2"), "2024-05-03 07:45", "Norte"),
        ];
        let result = run_query(&rows, &criteria(None));
        let order: Vec<&str> = result.rows.iter().map(|r| r.row.num_interv.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_period_filter() {
        let rows = vec![
            row("d", Some("1"), "2024-05-03 07:00", "Norte"),
            row("n", Some("2"), "2024-05-03 22:00", "Norte"),
            row("o", Some("3"), "2024-05-03 10:00", "Norte"),
        ];
        let nums = |periodo| -> Vec<String> {
            run_query(&rows, &criteria(periodo))
                .rows
                .iter()
                .map(|r| r.row.num_interv.clone())
                .collect()
        };
        assert_eq!(nums(Some("Diurno")), vec!["d"]);
        assert_eq!(nums(Some("Noturno")), vec!["n"]);
        assert_eq!(nums(None), vec!["d", "n", "o"]);
        assert_eq!(nums(Some(SELECT_PLACEHOLDER)), vec!["d", "n", "o"]);
    }

    #[test]
    fn test_mandatory_criteria_and_date() {
        let rows = vec![
            row("1", Some("1"), "2024-05-03 07:00", "Norte"),
            row("2", Some("1"), "2024-05-03 07:00", "Sul"),
            row("3", Some("1"), "2024-05-04 07:00", "Norte"),
            row("4", Some("1"), "not a date", "Norte"),
        ];
        let result = run_query(&rows, &criteria(None));
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].row.num_interv, "1");
    }

    #[test]
    fn test_counts_descending_ties_first_seen() {
        let rows = vec![
            row("300", Some("1"), "2024-05-03 07:00", "Norte"),
            row("100", Some("2"), "2024-05-03 07:00", "Norte"),
            row("200", Some("3"), "2024-05-03 07:00", "Norte"),
            row("200", Some("4"), "2024-05-03 07:00", "Norte"),
            row("100", Some("5"), "2024-05-03 07:00", "Norte"),
        ];
        let result = run_query(&rows, &criteria(None));
        let counts: Vec<(&str, usize)> = result
            .counts
            .iter()
            .map(|c| (c.num_interv.as_str(), c.count))
            .collect();
        assert_eq!(counts, vec![("100", 2), ("200", 2), ("300", 1)]);
    }

    #[test]
    fn test_no_match_is_empty_result() {
        let rows = vec![row("1", Some("1"), "2024-05-03 07:00", "Sul")];
        let result = run_query(&rows, &criteria(None));
        assert!(result.is_empty());
        assert!(result.counts.is_empty());
    }

    #[test]
    fn test_from_selections_requires_all_mandatory() {
        let mut selections = Selections {
            rodovia: Some("A".into()),
            tipo: Some(SELECT_PLACEHOLDER.into()),
            data: Some("03/05/2024".into()),
            sentido: Some("Norte".into()),
            executor: Some("Equipe A".into()),
            periodo: None,
        };
        assert_eq!(
            QueryCriteria::from_selections(&selections),
            Err(QueryError::MissingSelection("Tipo"))
        );

        selections.tipo = Some("Conserva".into());
        let criteria = QueryCriteria::from_selections(&selections).unwrap();
        assert_eq!(criteria.data, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
        assert_eq!(criteria.periodo, PeriodFilter::Any);

        selections.executor = Some("  ".into());
        assert_eq!(
            QueryCriteria::from_selections(&selections),
            Err(QueryError::MissingSelection("Executor"))
        );
    }

    #[test]
    fn test_from_selections_rejects_bad_date_and_period() {
        let mut selections = Selections {
            rodovia: Some("A".into()),
            tipo: Some("B".into()),
            data: Some("amanhã".into()),
            sentido: Some("C".into()),
            executor: Some("D".into()),
            periodo: None,
        };
        assert_eq!(
            QueryCriteria::from_selections(&selections),
            Err(QueryError::InvalidDate("amanhã".into()))
        );
        selections.data = Some("2024-05-03".into());
        selections.periodo = Some("Outro".into());
        assert_eq!(
            QueryCriteria::from_selections(&selections),
            Err(QueryError::InvalidPeriod("Outro".into()))
        );
    }

    #[test]
    fn test_filter_options_distinct_sorted() {
        let mut rows = vec![
            row("1", None, "2024-05-04 07:00", "Sul"),
            row("2", None, "2024-05-03 07:00", "Norte"),
            row("3", None, "", "Sul"),
        ];
        rows[2].row.rodovia = "B".to_string();
        rows[1].row.executor = " ".to_string();

        let options = FilterOptions::from_rows(&rows);
        assert_eq!(options.rodovias, vec!["A", "B"]);
        assert_eq!(options.sentidos, vec!["Norte", "Sul"]);
        assert_eq!(options.executores, vec!["Equipe A"]);
        assert_eq!(options.date_labels(), vec!["2024-05-03", "2024-05-04"]);
        assert_eq!(with_placeholder(&options.tipos), vec![SELECT_PLACEHOLDER, "Conserva"]);
    }
}
