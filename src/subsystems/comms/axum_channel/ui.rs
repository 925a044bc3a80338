//! HTML pages. Static forms are const strings; the answer page is rendered
//! per request with every dynamic value escaped.

use axum::response::{Html, Redirect};

use crate::subsystems::notes::{Answer, NoteTags};

const STYLE: &str = r#"<style>
    *, *::before, *::after { box-sizing: border-box; }
    body {
      font-family: system-ui, -apple-system, sans-serif;
      background: #f6f7f9; color: #1d1f23;
      max-width: 44rem; margin: 2rem auto; padding: 0 1rem;
    }
    h1 { font-size: 1.4rem; }
    form, .card {
      background: #fff; border: 1px solid #dde1e6; border-radius: 10px;
      padding: 1.25rem 1.5rem; margin-bottom: 1rem;
    }
    label { display: block; font-size: 0.85rem; margin: 0.75rem 0 0.25rem; color: #555; }
    input, textarea { width: 100%; padding: 0.45rem; font: inherit; }
    button {
      margin-top: 1rem; padding: 0.5rem 1.4rem; border: 0; border-radius: 8px;
      background: #2f5fb3; color: #fff; font: inherit; cursor: pointer;
    }
    pre { white-space: pre-wrap; background: #f0f2f5; padding: 0.75rem; border-radius: 6px; }
    nav a { margin-right: 1rem; }
  </style>"#;

const TEACHER_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Upload notes</title>
  {{style}}
</head>
<body>
  <nav><a href="/teacher">Teacher</a><a href="/student">Student</a></nav>
  <h1>Upload class notes</h1>
  <form action="/ingest" method="post" enctype="multipart/form-data">
    <label for="class_name">Class</label>
    <input id="class_name" name="class_name" required />
    <label for="subject">Subject</label>
    <input id="subject" name="subject" required />
    <label for="topic">Topic</label>
    <input id="topic" name="topic" required />
    <label for="file">Notes file (.txt)</label>
    <input id="file" name="file" type="file" accept=".txt,text/plain" required />
    <button type="submit">Upload</button>
  </form>
</body>
</html>
"#;

const STUDENT_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Ask a question</title>
  {{style}}
</head>
<body>
  <nav><a href="/teacher">Teacher</a><a href="/student">Student</a></nav>
  <h1>Ask about your class notes</h1>
  <form action="/ask" method="post">
    <label for="class_name">Class</label>
    <input id="class_name" name="class_name" required />
    <label for="subject">Subject</label>
    <input id="subject" name="subject" required />
    <label for="topic">Topic</label>
    <input id="topic" name="topic" required />
    <label for="question">Question</label>
    <textarea id="question" name="question" rows="3" required></textarea>
    <label for="k">Chunks to retrieve</label>
    <input id="k" name="k" type="number" min="1" value="3" />
    <button type="submit">Ask</button>
  </form>
</body>
</html>
"#;

/// GET /
pub(super) async fn root() -> Redirect {
    Redirect::to("/teacher")
}

/// GET /teacher
pub(super) async fn teacher() -> Html<String> {
    Html(TEACHER_HTML.replace("{{style}}", STYLE))
}

/// GET /student
pub(super) async fn student() -> Html<String> {
    Html(STUDENT_HTML.replace("{{style}}", STYLE))
}

pub(super) fn render_answer(question: &str, tags: &NoteTags, answer: &Answer) -> String {
    let sources: String = answer
        .sources
        .iter()
        .map(|s| format!("    <pre>{}</pre>\n", escape_html(s)))
        .collect();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Answer</title>
  {style}
</head>
<body>
  <nav><a href="/teacher">Teacher</a><a href="/student">Ask another</a></nav>
  <h1>{class_name} / {subject} / {topic}</h1>
  <div class="card">
    <strong>Question</strong>
    <p>{question}</p>
    <strong>Answer</strong>
    <p>{answer}</p>
  </div>
  <div class="card">
    <strong>Sources</strong>
{sources}  </div>
</body>
</html>
"#,
        style = STYLE,
        class_name = escape_html(&tags.class_name),
        subject = escape_html(&tags.subject),
        topic = escape_html(&tags.topic),
        question = escape_html(question),
        answer = escape_html(&answer.answer),
        sources = sources,
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────
