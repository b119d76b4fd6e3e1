//! Comparison charts across results files
//!
//! A chart compares one primary statistic (e.g. mean execution time) per
//! template across several series (one per results file), with a secondary
//! statistic (e.g. error count) alongside.
//!
//! The chart is printed as tables and exported as a JSON dataset for plotting:
//!
//! ```json
//! {
//!   "primary_label": "Mean execution time (ms)",
//!   "secondary_label": "Errors",
//!   "categories": ["interactive-discover-1", "interactive-short-1"],
//!   "primary": { "default": { "interactive-discover-1": 1372.7, "interactive-short-1": -1.0 } },
//!   "secondary": { "default": { "interactive-discover-1": 0.0, "interactive-short-1": 2.0 } }
//! }
//! ```
//!
//! `-1` marks a timed-out or otherwise unavailable value and must not be
//! drawn as a zero-height bar.

use benchagg_analysis::{
    group::{GroupKey, GroupMap},
    reducer::Summary,
};
use serde::Serialize;

const TEMPLATE_PREFIX: &str = "interactive-";
const UNAVAILABLE_MARK: &str = "X";
const LABEL_WIDTH: usize = 20;
const VALUE_WIDTH: usize = 14;

#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub name: String,
    pub primary: GroupMap<Summary>,
    pub secondary: GroupMap<Summary>,
}

#[derive(Debug, Clone)]
pub struct ComparisonChart {
    primary_label: &'static str,
    secondary_label: &'static str,
    categories: Vec<GroupKey>,
    series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub primary_label: &'static str,
    pub secondary_label: &'static str,
    pub categories: Vec<GroupKey>,
    pub primary: GroupMap<GroupMap<f64>>,
    pub secondary: GroupMap<GroupMap<f64>>,
}

/// Sort key of a template name shaped `prefix-family-N`.
///
/// Numbered templates sort by family, then numerically by number; any other
/// name sorts after them, lexically.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum TemplateOrder<'a> {
    Numbered { family: &'a str, number: u64 },
    Other(String),
}

impl<'a> TemplateOrder<'a> {
    fn of(key: &'a GroupKey) -> Self {
        if let GroupKey::String(name) = key {
            let mut parts = name.splitn(3, '-').skip(1);
            if let (Some(family), Some(number)) = (parts.next(), parts.next()) {
                if let Ok(number) = number.parse() {
                    return Self::Numbered { family, number };
                }
            }
        }
        Self::Other(key.to_string())
    }

    fn family(&self) -> Option<&'a str> {
        match self {
            Self::Numbered { family, .. } => Some(*family),
            Self::Other(_) => None,
        }
    }
}

fn category_label(key: &GroupKey) -> String {
    let name = key.to_string();
    match name.strip_prefix(TEMPLATE_PREFIX) {
        Some(stripped) => stripped.to_owned(),
        None => name,
    }
}

impl ComparisonChart {
    /// Builds a chart over the templates of the first series.
    pub fn new(
        primary_label: &'static str,
        secondary_label: &'static str,
        series: Vec<ChartSeries>,
    ) -> Self {
        let mut categories = series
            .first()
            .map(|s| s.primary.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        categories.sort_by(|a, b| TemplateOrder::of(a).cmp(&TemplateOrder::of(b)));
        Self {
            primary_label,
            secondary_label,
            categories,
            series,
        }
    }

    /// The chart values, with `-1` for unavailable or missing entries.
    pub fn dataset(&self) -> ChartDataset {
        let values = |pick: fn(&ChartSeries) -> &GroupMap<Summary>| {
            self.series
                .iter()
                .map(|s| {
                    let row = self
                        .categories
                        .iter()
                        .map(|c| (c.clone(), cell(pick(s), c).value_or_sentinel()))
                        .collect::<GroupMap<_>>();
                    (GroupKey::from(s.name.as_str()), row)
                })
                .collect::<GroupMap<_>>()
        };
        ChartDataset {
            primary_label: self.primary_label,
            secondary_label: self.secondary_label,
            categories: self.categories.clone(),
            primary: values(|s| &s.primary),
            secondary: values(|s| &s.secondary),
        }
    }

    pub fn print(&self) {
        println!("{}", self.primary_label);
        self.print_table(|s| &s.primary);
        println!();
        println!("{}", self.secondary_label);
        self.print_table(|s| &s.secondary);
        println!();
        println!("  {UNAVAILABLE_MARK} = timed out / no data");
    }

    fn print_table(&self, pick: fn(&ChartSeries) -> &GroupMap<Summary>) {
        print!("  {:<LABEL_WIDTH$}", "Template");
        for series in &self.series {
            print!(" {:>VALUE_WIDTH$}", truncate(&series.name, VALUE_WIDTH));
        }
        println!();
        let width = LABEL_WIDTH + (VALUE_WIDTH + 1) * self.series.len();
        println!("  {}", "-".repeat(width));

        let mut previous_family = None;
        for category in &self.categories {
            let family = TemplateOrder::of(category).family();
            if previous_family.is_some() && family != previous_family {
                println!("  {}", "-".repeat(width));
            }
            previous_family = family;

            print!("  {:<LABEL_WIDTH$}", category_label(category));
            for series in &self.series {
                print!(" {:>VALUE_WIDTH$}", format_cell(cell(pick(series), category)));
            }
            println!();
        }
    }
}

static MISSING: Summary = Summary::Scalar(None);

fn cell<'a>(values: &'a GroupMap<Summary>, category: &GroupKey) -> &'a Summary {
    values.get(category).unwrap_or(&MISSING)
}

fn format_cell(summary: &Summary) -> String {
    match summary {
        Summary::Count(n) => n.to_string(),
        _ => summary
            .value()
            .map_or(UNAVAILABLE_MARK.to_owned(), |v| format!("{v:.2}")),
    }
}

fn truncate(s: &str, width: usize) -> &str {
    match s.char_indices().nth(width) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summaries(entries: &[(&str, Option<f64>)]) -> GroupMap<Summary> {
        entries
            .iter()
            .map(|(k, v)| (GroupKey::from(*k), Summary::Scalar(*v)))
            .collect()
    }

    #[test]
    fn test_categories_sorted_by_family_then_number() {
        let series = ChartSeries {
            name: "default".into(),
            primary: summaries(&[
                ("interactive-short-10", Some(1.0)),
                ("interactive-short-2", Some(1.0)),
                ("interactive-discover-3", Some(1.0)),
                ("custom", Some(1.0)),
                ("interactive-discover-1", Some(1.0)),
            ]),
            secondary: GroupMap::new(),
        };
        let chart = ComparisonChart::new("time", "errors", vec![series]);
        let names = chart
            .categories
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "interactive-discover-1",
                "interactive-discover-3",
                "interactive-short-2",
                "interactive-short-10",
                "custom",
            ]
        );
    }

    #[test]
    fn test_dataset_uses_sentinel_for_unavailable_and_missing() {
        let a = ChartSeries {
            name: "a".into(),
            primary: summaries(&[("interactive-short-1", Some(2.5)), ("interactive-short-2", None)]),
            secondary: [(GroupKey::from("interactive-short-1"), Summary::Count(3))]
                .into_iter()
                .collect(),
        };
        let b = ChartSeries {
            name: "b".into(),
            primary: summaries(&[("interactive-short-1", Some(1.0))]),
            secondary: GroupMap::new(),
        };
        let dataset = ComparisonChart::new("time", "errors", vec![a, b]).dataset();

        let a_primary = dataset.primary.get(&"a".into()).unwrap();
        assert_eq!(a_primary.get(&"interactive-short-1".into()), Some(&2.5));
        assert_eq!(a_primary.get(&"interactive-short-2".into()), Some(&-1.0));
        let b_primary = dataset.primary.get(&"b".into()).unwrap();
        assert_eq!(b_primary.get(&"interactive-short-2".into()), Some(&-1.0));
        let a_secondary = dataset.secondary.get(&"a".into()).unwrap();
        assert_eq!(a_secondary.get(&"interactive-short-1".into()), Some(&3.0));
    }

    #[test]
    fn test_dataset_json_shape() {
        let a = ChartSeries {
            name: "a".into(),
            primary: summaries(&[("q", None)]),
            secondary: summaries(&[("q", Some(0.0))]),
        };
        let json = serde_json::to_value(ComparisonChart::new("t", "e", vec![a]).dataset()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "primary_label": "t",
                "secondary_label": "e",
                "categories": ["q"],
                "primary": {"a": {"q": -1.0}},
                "secondary": {"a": {"q": 0.0}},
            })
        );
    }

    #[test]
    fn test_empty_chart() {
        let chart = ComparisonChart::new("t", "e", vec![]);
        assert!(chart.categories.is_empty());
        assert!(chart.dataset().primary.is_empty());
    }

    #[test]
    fn test_category_label_strips_prefix() {
        assert_eq!(category_label(&"interactive-short-1".into()), "short-1");
        assert_eq!(category_label(&"custom".into()), "custom");
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&Summary::Scalar(None)), "X");
        assert_eq!(format_cell(&Summary::Scalar(Some(1.234))), "1.23");
        assert_eq!(format_cell(&Summary::Count(4)), "4");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
    }
}
