//! Canned answers used when the pipeline cannot produce a grounded one.
//!
//! Pure functions over static text: no I/O, never fails.

/// Which canned answer a question maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackVariant {
    /// Detailed biography, for questions about Prince or his background.
    Biography,
    /// Short invitation listing what can be asked.
    Generic,
}

/// Lower-case substring → variant. First match wins; no match means [`FallbackVariant::Generic`].
pub const KEYWORD_TABLE: &[(&str, FallbackVariant)] = &[
    ("prince", FallbackVariant::Biography),
    ("experience", FallbackVariant::Biography),
    ("skills", FallbackVariant::Biography),
];

pub const ASK_PROMPT: &str = "Please ask me something about Prince Pal!";

pub const RATE_LIMIT_NOTICE: &str = "I'm currently experiencing high demand. Please try your question again in a few moments. In the meantime, I can tell you that Prince Pal is a skilled full-stack developer with experience in React, Node.js, and cloud technologies.";

pub const SERVER_ERROR: &str =
    "I'm experiencing technical difficulties. Please try again in a moment.";

pub const GENERIC_ANSWER: &str = "I'd be happy to help you learn more about Prince Pal! You can ask me about his experience, skills, projects, or educational background.";

pub const BIOGRAPHY: &str = r#"Based on my knowledge of Prince Pal:

**About Prince Pal:**
Prince Pal is a skilled software developer currently pursuing B.Tech in Electrical Engineering at Madan Mohan Malaviya University of Technology in Gorakhpur, Uttar Pradesh, India.

**Professional Experience:**
- **Software Developer Intern at BlackBytt (Oct 2024 – Dec 2024)**
  - Proficient in Agile methodologies
  - Skilled in code analysis and debugging
  - Designed custom templates using Liquid template language
  - Developed custom UI components with HTML, CSS, and JavaScript

- **Problem Setter Freelance at Imocha (Aug 2022 – Apr 2023)**
  - Developed challenging data structure and algorithm problems
  - Contributed to technical interview assessments

**Technical Skills:**
- **Languages:** JavaScript, TypeScript, Python, Golang
- **Frontend:** React.js, Next.js, Redux, Zustand, Tailwind CSS
- **Backend:** Node.js, Express.js, Next.js
- **Database:** MongoDB, PostgreSQL
- **Tools:** Git, GitHub, AWS, Docker, Langchain

**Notable Projects:**
- AI Waste Management System
- RAG Chatbot

Would you like to know more about any specific aspect of Prince's background or projects?"#;

/// Picks the variant for `question` (case-insensitive substring match).
pub fn classify(question: &str) -> FallbackVariant {
    let lower = question.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, variant)| *variant)
        .unwrap_or(FallbackVariant::Generic)
}

impl FallbackVariant {
    pub fn text(self) -> &'static str {
        match self {
            FallbackVariant::Biography => BIOGRAPHY,
            FallbackVariant::Generic => GENERIC_ANSWER,
        }
    }
}

/// Canned answer for `question`.
pub fn respond(question: &str) -> &'static str {
    classify(question).text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_select_biography() {
        assert_eq!(respond("What are Prince's skills?"), BIOGRAPHY);
        assert_eq!(respond("Tell me about his EXPERIENCE"), BIOGRAPHY);
        assert_eq!(respond("list your skills"), BIOGRAPHY);
    }

    #[test]
    fn other_questions_get_generic_answer() {
        assert_eq!(respond("What's the weather?"), GENERIC_ANSWER);
        assert_eq!(respond(""), GENERIC_ANSWER);
    }

    #[test]
    fn deterministic() {
        let q = "Where did Prince study?";
        assert_eq!(respond(q), respond(q));
    }

    #[test]
    fn biography_shape() {
        assert!(BIOGRAPHY.starts_with("Based on my knowledge of Prince Pal:"));
        assert!(BIOGRAPHY.contains("BlackBytt"));
        assert!(BIOGRAPHY.ends_with("background or projects?"));
    }
}
