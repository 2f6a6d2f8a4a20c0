//! Prompt builder: persona template + retrieved context + question.

use std::borrow::Cow;

/// Persona prompt with two named slots, `{context}` and `{question}`.
pub const PERSONA_TEMPLATE: &str = r#"You are an AI assistant with detailed knowledge of Prince Pal, his work experience, technical expertise, and notable projects. Prince Pal is a skilled software developer pursuing a B.Tech in Electrical Engineering at Madan Mohan Malaviya University of Technology, Gorakhpur. He has consistently demonstrated a strong foundation in software development, full-stack engineering, and AI-based systems.

Prince has hands-on experience in backend, mobile, and cloud development, and excels in building scalable and user-centric applications.

Internship Experience:
• Software Developer Intern at Dodoozy (Apr 2025 – Present): Focused on mobile app development with React Native, Context API, Expo Router.
• Software Developer Intern at BlackBytt (Oct 2024 – Dec 2024): Built full-stack MERN apps for 2500+ users, optimized performance and deployment.
• Problem Setter at Imocha (Aug 2022 – Apr 2023): Created 100+ high-quality DSA challenges, improving test quality.

Technical Skills:
• Programming: JavaScript, TypeScript, Python, Golang, C++, Java, SQL
• Frontend: React.js, Next.js, React Native, Tailwind CSS, Redux, Zustand, Shadcn, React Query
• Backend: Node.js, Express.js, FastAPI
• Databases: MongoDB, PostgreSQL, AstraDB, Firestore, Vector Stores (Pinecone, Qdrant)
• Tools & DevOps: Git, GitHub, Bitbucket, Docker, AWS, Firebase, Vercel, Postman, EAS Build
• AI/ML: LangChain, LangGraph, LlamaIndex, RAG, Gemini API, Meta Llama, Prompt Engineering, Streamlit, Pandas, NumPy, Hugging Face
• Concepts: REST APIs, CI/CD, Test Automation, Microservices, Scalable Systems

Notable Projects:
• **RAG-Chatbot** – Resume-aware AI chatbot using LangChain, Gemini API, and AstraDB (95% accuracy, 5s response time).
• **EcoQuest** – Waste management platform integrating Gemini API and Google Maps, reducing response time by 30%.
• **Learnify** – LMS with secure auth, optimized React Query usage, and zero downtime across 25+ updates.
• **Perplexity 2.0 Agent** – Web search agent with server-side streaming, Llama integration, and LangGraph orchestration.
• **LinkedIn Post Generator** – Few-shot learning tool using Meta Llama for content generation with 85%+ positive feedback.
• **Splitmate** – Mobile expense tracker using Firebase, Zustand, AsyncStorage (served 300+ users).
• **Medialarm** – Personalized medicine tracker with biometric auth and calendar-based reminders.
• **CabRide** – Ride-hailing app with real-time GPS tracking, Clerk auth, and Google Maps integration.

Achievements:
• Knight at LeetCode (1850+), 3-star at CodeChef, Pupil at Codeforces
• Solved 900+ DSA problems across platforms
• Top 1.3k out of 30,000+ participants in national-level coding contests

Use the following context to enhance your responses about Prince Pal. Keep responses concise and relevant.

Context: {context}

Question: {question}

Provide a helpful and informative response about Prince Pal based on the context and question."#;

/// Default cap on the context substituted into the template.
pub const DEFAULT_MAX_CTX_CHARS: usize = 8000;

/// Builds the generation prompt.
///
/// Only the context is clamped; the template and the question always go out whole.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    template: Cow<'static, str>,
    max_ctx_chars: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CTX_CHARS)
    }
}

impl PromptBuilder {
    pub fn new(max_ctx_chars: usize) -> Self {
        Self {
            template: Cow::Borrowed(PERSONA_TEMPLATE),
            max_ctx_chars,
        }
    }

    /// Same builder with a custom template (tests, alternative personas).
    pub fn with_template(mut self, template: impl Into<Cow<'static, str>>) -> Self {
        self.template = template.into();
        self
    }

    /// # Example
    /// ```
    /// use contextor::prompt::PromptBuilder;
    /// let p = PromptBuilder::new(100).with_template("C={context} Q={question}");
    /// assert_eq!(p.build("bio", "who?"), "C=bio Q=who?");
    /// ```
    pub fn build(&self, context: &str, question: &str) -> String {
        let context = clamp_chars(context, self.max_ctx_chars);
        render(&self.template, &[("context", context.as_ref()), ("question", question)])
    }
}

/// Single-pass `{name}` substitution.
///
/// Values are copied verbatim, so a value that itself contains `{question}`
/// is never expanded. Unknown or unterminated slots are left as they are.
pub fn render(template: &str, slots: &[(&str, &str)]) -> String {
    let extra: usize = slots.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            slots
                .iter()
                .find(|(slot, _)| *slot == name)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Cuts `s` to at most `max` characters on a char boundary, marking the cut with `…`.
pub fn clamp_chars(s: &str, max: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max) {
        None => Cow::Borrowed(s),
        Some((end, _)) => {
            let mut out = String::with_capacity(end + '…'.len_utf8());
            out.push_str(&s[..end]);
            out.push('…');
            Cow::Owned(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_has_both_slots() {
        assert!(PERSONA_TEMPLATE.contains("Context: {context}"));
        assert!(PERSONA_TEMPLATE.contains("Question: {question}"));
        assert!(PERSONA_TEMPLATE.starts_with("You are an AI assistant"));
    }

    #[test]
    fn builds_full_prompt() {
        let p = PromptBuilder::default().build("Worked at BlackBytt.", "Where did he intern?");
        assert!(p.contains("Context: Worked at BlackBytt.\n\nQuestion: Where did he intern?"));
        assert!(!p.contains("{context}"));
        assert!(!p.contains("{question}"));
    }

    #[test]
    fn substituted_values_are_not_expanded() {
        let out = render(
            "{context} | {question}",
            &[("context", "{question}"), ("question", "q")],
        );
        assert_eq!(out, "{question} | q");
    }

    #[test]
    fn unknown_and_unterminated_slots_survive() {
        assert_eq!(render("a {x} b {", &[("context", "c")]), "a {x} b {");
        assert_eq!(render("{}", &[]), "{}");
    }

    #[test]
    fn context_is_clamped_but_question_is_not() {
        let long_q = "q".repeat(50);
        let p = PromptBuilder::new(4)
            .with_template("{context}/{question}")
            .build("ééééééé", &long_q);
        assert_eq!(p, format!("éééé…/{long_q}"));
    }

    #[test]
    fn clamp_keeps_short_input() {
        assert!(matches!(clamp_chars("abc", 3), Cow::Borrowed("abc")));
        assert_eq!(clamp_chars("abcd", 3), "abc…");
        assert_eq!(clamp_chars("", 0), "");
    }
}
