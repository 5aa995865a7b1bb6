//! Prompt construction for quiz generation.
//!
//! The model is instructed to answer in a strict line format so the reply
//! can be parsed back into question/answer pairs:
//!
//! ```text
//! Question1: [question content]
//! Answer1: [answer content]
//! ```
//!
//! Each language has its own marker words; see [`Language::markers`].

use crate::error::{QuizError, Result};
use crate::types::{Language, QuestionType, ResponseFormat};

/// Maximum number of source characters embedded in a prompt.
pub const MAX_SOURCE_CHARS: usize = 200_000;

const TYPE_SEPARATORS: [char; 3] = [',', '、', '，'];

/// Parse a delimited question-type string such as `單選選擇題,問答題`
/// or `單選選擇題、申論題`.
pub fn parse_question_types(input: &str) -> Result<Vec<QuestionType>> {
    normalize_question_types([input])
}

/// Normalize a collection of question-type labels.
///
/// Every element is split on the same separators as a delimited string, so
/// `["a,b"]` and `"a,b"` yield the same selection. Duplicates keep their
/// first position.
pub fn normalize_question_types<I, S>(labels: I) -> Result<Vec<QuestionType>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut selected = Vec::new();
    for label in labels {
        for part in label.as_ref().split(TYPE_SEPARATORS) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let question_type: QuestionType = part.parse()?;
            if !selected.contains(&question_type) {
                selected.push(question_type);
            }
        }
    }

    if selected.is_empty() {
        return Err(QuizError::NoQuestionTypes);
    }
    Ok(selected)
}

/// Truncate `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Builder for the instruction sent to the completion provider.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    language: Language,
    question_types: Vec<QuestionType>,
    count: u32,
    max_source_chars: usize,
    format: ResponseFormat,
}

impl PromptBuilder {
    pub fn new(language: Language, question_types: Vec<QuestionType>, count: u32) -> Self {
        Self {
            language,
            question_types,
            count,
            max_source_chars: MAX_SOURCE_CHARS,
            format: ResponseFormat::Numbered,
        }
    }

    pub fn max_source_chars(mut self, max: usize) -> Self {
        self.max_source_chars = max;
        self
    }

    pub fn format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    /// Validate the selection without rendering anything.
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(QuizError::InvalidCount(self.count));
        }
        if self.question_types.is_empty() {
            return Err(QuizError::NoQuestionTypes);
        }
        Ok(())
    }

    /// Localized question types joined with the language's list separator.
    pub fn localized_types(&self) -> String {
        self.question_types
            .iter()
            .map(|t| t.localized(self.language))
            .collect::<Vec<_>>()
            .join(self.language.list_separator())
    }

    pub fn build(&self, source_text: &str) -> Result<String> {
        self.validate()?;

        let text = truncate_chars(source_text, self.max_source_chars);
        let types = self.localized_types();
        let n = self.count;

        let prompt = match self.format {
            ResponseFormat::Numbered => numbered_template(self.language, n, &types, text),
            ResponseFormat::Inline => inline_template(self.language, n, &types, text),
        };
        Ok(prompt)
    }
}

/// Build a numbered-format prompt with the default source limit.
pub fn build_prompt(
    language: Language,
    question_types: &[QuestionType],
    count: u32,
    source_text: &str,
) -> Result<String> {
    PromptBuilder::new(language, question_types.to_vec(), count).build(source_text)
}

fn numbered_template(language: Language, n: u32, types: &str, text: &str) -> String {
    match language {
        Language::TraditionalChinese => format!(
            "你是一位專業的出題者，請根據以下內容，設計 {n} 題以下類型的題目：{types}。
請嚴格按照以下格式輸出每個題目和答案：

題目1：[題目內容]
答案1：[答案內容]

題目2：[題目內容]
答案2：[答案內容]

...以此類推

請確保題號和答案號一一對應，不要使用其他格式。內容如下：
{text}"
        ),
        Language::SimplifiedChinese => format!(
            "你是一位专业的出题者，请根据以下内容，设计 {n} 题以下类型的题目：{types}。
请严格按照以下格式输出每个题目和答案：

题目1：[题目内容]
答案1：[答案内容]

题目2：[题目内容]
答案2：[答案内容]

...以此类推

请确保题号和答案号一一对应，不要使用其他格式。内容如下：
{text}"
        ),
        Language::English => format!(
            "You are a professional exam writer. Based on the following content, generate {n} questions of types: {types}.
Please strictly follow this format for each question and answer:

Question1: [question content]
Answer1: [answer content]

Question2: [question content]
Answer2: [answer content]

...and so on

Ensure that question numbers and answer numbers correspond exactly. Do not use any other format. Content:
{text}"
        ),
        Language::Japanese => format!(
            "あなたはプロの出題者です。以下の内容に基づいて、{types}を含む{n}問の問題を作成してください。
以下の形式で各問題と回答を出力してください：

問題1：[問題内容]
回答1：[回答内容]

問題2：[問題内容]
回答2：[回答内容]

...など

問題番号と回答番号が正確に対応していることを確認してください。他の形式は使用しないでください。内容：
{text}"
        ),
    }
}

fn inline_template(language: Language, n: u32, types: &str, text: &str) -> String {
    match language {
        Language::TraditionalChinese => format!(
            "你是一位專業的出題者，請根據以下內容，設計 {n} 題以下類型的題目：{types}。
每題只佔一行，格式為：題目內容【答案】答案內容
不要編號，不要使用其他格式。內容如下：
{text}"
        ),
        Language::SimplifiedChinese => format!(
            "你是一位专业的出题者，请根据以下内容，设计 {n} 题以下类型的题目：{types}。
每题只占一行，格式为：题目内容【答案】答案内容
不要编号，不要使用其他格式。内容如下：
{text}"
        ),
        Language::English => format!(
            "You are a professional exam writer. Based on the following content, generate {n} questions of types: {types}.
Write each question on a single line in the form: question text [Answer: answer text]
Do not number the lines. Do not use any other format. Content:
{text}"
        ),
        Language::Japanese => format!(
            "あなたはプロの出題者です。以下の内容に基づいて、{types}を含む{n}問の問題を作成してください。
各問題は一行で、形式は：問題内容【答え】回答内容
番号は付けず、他の形式は使用しないでください。内容：
{text}"
        ),
    }
}
