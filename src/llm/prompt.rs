use crate::document::DocumentText;

/// Fixed instruction sent to the model: answer only from the data, say so when the
/// answer is missing, and restate the question in a fixed answer pattern.
pub fn format(question: &str, data: &DocumentText) -> String {
    format!(
        r#"
You are a helpful assistant. Answer the following question using ONLY the data provided below.

If the answer is not in the data, say "I couldn’t find the answer in the provided content."

Question:
{question}

Data:
{data}

THE ANSWER SHOULD FOLLOW FORMAT AS: FOR THE GIVEN QUESTION {question}, the answer is <answer>.
"#,
        question = question,
        data = data.as_str(),
    )
}
