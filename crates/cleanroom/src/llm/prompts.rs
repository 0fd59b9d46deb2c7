//! Prompt templates for LLM interactions.

/// Placeholder substituted for missing-like cells before sending.
pub const MISSING: &str = "MISSING";

/// Column added with a Yes/No loyalty judgement.
pub const LOYALTY_COLUMN: &str = "is_loyal_customer";

/// Column added with a short customer description.
pub const PERSONA_COLUMN: &str = "customer_persona";

const TABLE_OPEN: &str = "```csv\n";
const TABLE_CLOSE: &str = "```";

/// System prompt shared by every provider.
pub fn system_prompt() -> &'static str {
    "You are a data cleaning and enrichment agent for customer records. \
     You answer with a CSV table only, never with commentary."
}

/// Build the enrichment prompt around a fully quoted CSV table.
pub fn enrichment_prompt(table: &str) -> String {
    format!(
        r#"For the following CSV, fill in every '{missing}' value in each row with a realistic, plausible value in the same format as the other values in that column.
If you cannot infer a value, generate a random plausible value in the same format as the rest of the column.

Additionally, for each row, add two new columns:
- '{loyalty}': Yes or No, based on the customer's profile
- '{persona}': at most two lines describing their likely personality, values, and buying habits

Return the result as a CSV with the same columns as the input plus the two new columns, and no extra text.
IMPORTANT: Enclose every field in double quotes. Do NOT use commas inside any field (use semicolons or periods instead). Do not add any header or footer text.

{open}{table}{close}"#,
        missing = MISSING,
        loyalty = LOYALTY_COLUMN,
        persona = PERSONA_COLUMN,
        open = TABLE_OPEN,
        table = table,
        close = TABLE_CLOSE,
    )
}

/// The table embedded in a prompt built by [`enrichment_prompt`].
pub fn extract_table(prompt: &str) -> Option<&str> {
    let start = prompt.rfind(TABLE_OPEN)? + TABLE_OPEN.len();
    let rest = &prompt[start..];
    let end = rest.rfind(TABLE_CLOSE)?;
    Some(&rest[..end])
}
