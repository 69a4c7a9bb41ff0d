//! Extraction prompts for veterinary documents.
//!
//! These prompts are designed for Llama 3.2-Vision with JSON grammar constraints.

/// System prompt for document attribute extraction.
pub const SYSTEM_PROMPT: &str = r#"You are a veterinary records assistant that extracts pet identity information from scanned documents.

Extract the following attributes when present:
- microchip: Microchip number (usually 15 digits, may contain spaces)
- name: The pet's name
- age: Age exactly as written (e.g. "3 years", "6 months", "2 years 4 months")
- breed: The pet's breed
- gender: Sex marker exactly as written (e.g. "Male", "F", "Neutered Male")

Rules:
- Use null for any attribute the document does not state. Never guess.
- Copy values as written; do not normalize spelling or units.
- confidence is your overall extraction confidence from 0 to 100.

Output a JSON object with an "attributes" object and a "confidence" number."#;

/// User prompt template for attribute extraction.
pub fn make_extraction_prompt(document_text: &str) -> String {
    format!(
        r#"Extract the pet identity attributes from this veterinary document:

"{}"

Return a JSON object of the form:
{{"attributes": {{"microchip": ..., "name": ..., "age": ..., "breed": ..., "gender": ...}}, "confidence": ...}}

Use null for attributes the document does not state."#,
        document_text
    )
}

/// JSON grammar constraint for llama.cpp to ensure valid output format.
pub const JSON_GRAMMAR: &str = r#"
root ::= object
object ::= "{" ws "\"attributes\"" ws ":" ws attributes ws "," ws "\"confidence\"" ws ":" ws number ws "}"
attributes ::= "{" ws
    "\"microchip\"" ws ":" ws (string | "null") ws "," ws
    "\"name\"" ws ":" ws (string | "null") ws "," ws
    "\"age\"" ws ":" ws (string | "null") ws "," ws
    "\"breed\"" ws ":" ws (string | "null") ws "," ws
    "\"gender\"" ws ":" ws (string | "null") ws
"}"
string ::= "\"" ([^"\\] | "\\" .)* "\""
number ::= "-"? [0-9]+ ("." [0-9]+)?
ws ::= [ \t\n]*
"#;

/// Example few-shot prompts for better extraction accuracy.
pub const FEW_SHOT_EXAMPLES: &[(&str, &str)] = &[
    (
        "RABIES VACCINATION CERTIFICATE. Patient: Maximus. Breed: Golden Retriever. Sex: Neutered Male. Age: 3 years. Microchip: 985 112 003 456 789.",
        r#"{"attributes":{"microchip":"985 112 003 456 789","name":"Maximus","age":"3 years","breed":"Golden Retriever","gender":"Neutered Male"},"confidence":95}"#,
    ),
    (
        "Lab results for Bella (feline). Sample received 03/02. T4 within normal range.",
        r#"{"attributes":{"microchip":null,"name":"Bella","age":null,"breed":null,"gender":null},"confidence":70}"#,
    ),
    (
        "Invoice #2041. Professional services rendered. Total due: $182.50.",
        r#"{"attributes":{"microchip":null,"name":null,"age":null,"breed":null,"gender":null},"confidence":20}"#,
    ),
];

/// Build a complete prompt with system context and few-shot examples.
pub fn build_full_prompt(document_text: &str, include_examples: bool) -> String {
    let mut prompt = String::new();

    // System context
    prompt.push_str("<|system|>\n");
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n<|end|>\n");

    // Few-shot examples
    if include_examples {
        for (input, output) in FEW_SHOT_EXAMPLES {
            prompt.push_str("<|user|>\n");
            prompt.push_str(&make_extraction_prompt(input));
            prompt.push_str("\n<|end|>\n");
            prompt.push_str("<|assistant|>\n");
            prompt.push_str(output);
            prompt.push_str("\n<|end|>\n");
        }
    }

    // Actual request
    prompt.push_str("<|user|>\n");
    prompt.push_str(&make_extraction_prompt(document_text));
    prompt.push_str("\n<|end|>\n");
    prompt.push_str("<|assistant|>\n");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt() {
        let prompt = make_extraction_prompt("Patient: Maximus, 3 years old");
        assert!(prompt.contains("Patient: Maximus, 3 years old"));
        assert!(prompt.contains("attributes"));
        assert!(prompt.contains("microchip"));
    }

    #[test]
    fn test_full_prompt_with_examples() {
        let prompt = build_full_prompt("Test document", true);
        assert!(prompt.contains("<|system|>"));
        assert!(prompt.contains("veterinary records assistant"));
        assert!(prompt.contains("Golden Retriever")); // From examples
        assert!(prompt.contains("Test document"));
    }

    #[test]
    fn test_full_prompt_without_examples() {
        let prompt = build_full_prompt("Test document", false);
        assert!(prompt.contains("<|system|>"));
        assert!(!prompt.contains("RABIES VACCINATION")); // No examples
        assert!(prompt.contains("Test document"));
    }
}
