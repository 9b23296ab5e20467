// Prompt constants for the career flows.
// Templates use `{placeholder}` markers replaced before sending.

/// Shared system prompt. The flows only accept JSON back.
pub const CAREER_FLOW_SYSTEM: &str = "You are an experienced career counselor for students \
    exploring internships and first jobs. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Quiz generation prompt. Takes no input.
pub const QUIZ_PROMPT: &str = r#"Create a career interest quiz for a student who is unsure which career path fits them.

Write 8 to 10 multiple-choice questions covering interests, preferred work style,
strengths, and values. Each question has 3 to 5 short options.
Use stable ids "q1", "q2", ... in question order.

Return a JSON object with this EXACT schema (no extra fields):
{
  "questions": [
    {"id": "q1", "question": "Which activity sounds most fun?", "options": ["Building an app", "Organizing an event", "Painting a mural"]}
  ]
}"#;

/// Recommendation prompt. Replace `{quiz_json}` and `{answers_json}` before sending.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"A student took the career interest quiz below.

Quiz:
{quiz_json}

Answers (question id -> selected option or options):
{answers_json}

Recommend 3 to 5 career paths that fit the answers. For each, explain in one or two
sentences which answers point to it, and give a match score from 0 to 100.

Return a JSON object with this EXACT schema (no extra fields):
{
  "recommendations": [
    {"careerPath": "Software Engineer", "reasoning": "...", "matchScore": 85}
  ],
  "summary": "One short paragraph about the student's overall profile."
}"#;

/// Course recommendation prompt. Replace `{internships_json}` and `{skills_json}` before sending.
pub const COURSE_PROMPT_TEMPLATE: &str = r#"A student is preparing to apply for the internships below.

Internships:
{internships_json}

Skills the student already has:
{skills_json}

Suggest 3 to 6 online courses that close the gap between the student's skills and
the internships' requirements. Do not suggest courses for skills the student already has.

Return a JSON object with this EXACT schema (no extra fields):
{
  "courses": [
    {"title": "Intro to SQL", "provider": "Coursera", "reason": "...", "relatedInternship": "Data Analyst Intern"}
  ]
}"#;
