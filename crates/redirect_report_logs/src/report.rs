use crate::classify::Category;
use crate::rules::RedirectRule;

const PATH_COLUMN: &str = "path";

/// Renders the redirect rules as a delimited table.
///
/// The table starts with a header line, followed by one line per rule with
/// its counters and pattern. Rules are ordered by descending counts, with
/// `public` hits being the most significant.
pub fn format_report<'a>(
    rules: impl IntoIterator<Item = &'a RedirectRule>,
    delimiter: &str,
) -> String {
    let mut rules = rules.into_iter().collect::<Vec<_>>();
    rules.sort_by(|a, b| a.cmp_relevance(b));

    let header = Category::ALL
        .iter()
        .map(Category::as_str)
        .chain([PATH_COLUMN])
        .collect::<Vec<_>>();

    let mut output = header.join(delimiter);
    output.push('\n');

    for rule in rules {
        let counts = rule.counts();
        let mut row = Category::ALL
            .iter()
            .map(|category| counts.get(*category).to_string())
            .collect::<Vec<_>>();
        row.push(rule.source().to_string());

        output.push_str(&row.join(delimiter));
        output.push('\n');
    }

    output
}
