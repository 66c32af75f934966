use compass_core::College;
use gemini::ResponseSchema;

pub struct QueryPrompts;

impl QueryPrompts {
    pub fn search(job: &str, location: &str) -> String {
        format!(
            "Find colleges in or near {location} that have strong programs for a career in {job}. \
For each college, provide its name, city, state, acceptance rate as a number, estimated annual cost, \
a short description, and a reason why it's a good fit for this career."
        )
    }

    pub fn compare(colleges: &[College], job: &str) -> String {
        let college_list = colleges
            .iter()
            .map(|c| {
                format!(
                    "- {} (Annual Cost: ${}, Acceptance Rate: {}%)",
                    c.name,
                    format_usd(c.annual_cost),
                    c.acceptance_rate
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Analyze and compare the following colleges for a student pursuing a career in "{job}":
{college_list}

For each college, provide a short list of pros and cons.
Finally, provide a concluding recommendation for which college is the best overall choice and why."#
        )
    }
}

pub struct QuerySchemas;

impl QuerySchemas {
    /// Array of colleges, every field required.
    pub fn search() -> ResponseSchema {
        let college = ResponseSchema::object()
            .required_property(
                "name",
                ResponseSchema::string().describe("The name of the college."),
            )
            .required_property(
                "city",
                ResponseSchema::string().describe("The city where the college is located."),
            )
            .required_property(
                "state",
                ResponseSchema::string().describe("The state where the college is located."),
            )
            .required_property(
                "acceptanceRate",
                ResponseSchema::number()
                    .describe("Acceptance rate as a percentage (e.g., 75 for 75%)."),
            )
            .required_property(
                "annualCost",
                ResponseSchema::number().describe("Estimated annual cost in USD."),
            )
            .required_property(
                "description",
                ResponseSchema::string().describe("A short description of the college."),
            )
            .required_property(
                "reasonForFit",
                ResponseSchema::string().describe(
                    "A brief explanation of why this college is a good choice for the specified career.",
                ),
            );

        ResponseSchema::array(college)
    }

    /// Per-college pros/cons plus an overall recommendation.
    pub fn compare() -> ResponseSchema {
        let entry = ResponseSchema::object()
            .required_property(
                "name",
                ResponseSchema::string().describe("Name of the college."),
            )
            .required_property(
                "pros",
                ResponseSchema::array(ResponseSchema::string())
                    .describe("List of pros for this college."),
            )
            .required_property(
                "cons",
                ResponseSchema::array(ResponseSchema::string())
                    .describe("List of cons for this college."),
            );

        ResponseSchema::object()
            .required_property(
                "comparison",
                ResponseSchema::array(entry).describe("List of colleges with their pros and cons."),
            )
            .required_property(
                "recommendation",
                ResponseSchema::string().describe("The final recommendation and reasoning."),
            )
    }
}

/// Dollars with thousands separators and at most three fraction digits,
/// e.g. `30000.0` -> `30,000` and `30000.5` -> `30,000.5`.
pub fn format_usd(amount: f64) -> String {
    let fixed = format!("{:.3}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let negative = amount < 0.0 && (whole != "0" || !fraction.is_empty());

    let mut formatted = String::with_capacity(fixed.len() + whole.len() / 3 + 1);
    if negative {
        formatted.push('-');
    }
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(ch);
    }
    if !fraction.is_empty() {
        formatted.push('.');
        formatted.push_str(fraction);
    }
    formatted
}
