use async_trait::async_trait;
use search_debugger_core_types::SearchState;
use search_view::model::PlanContext;
use search_view::ports::PlanReportPort;
use search_view::ViewResult;
use serde_json::Value;

/// Renders a state as an HTML table of the fields the planner reported.
#[derive(Default)]
pub struct HtmlPlanReport;

impl HtmlPlanReport {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, state: &SearchState, context: &PlanContext) -> String {
        let mut html = String::from("<div class=\"state-plan\">");
        html.push_str(&format!(
            "<h3>State {} <small>({})</small></h3>",
            state.id,
            escape(&state.orig_id)
        ));
        if let Some(domain) = context.domain.as_deref().and_then(domain_name) {
            html.push_str(&format!("<p>Domain: {}</p>", escape(domain)));
        }
        html.push_str("<table>");
        for (key, value) in &state.detail {
            let text = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            html.push_str(&format!(
                "<tr><th>{}</th><td>{}</td></tr>",
                escape(key),
                escape(&text)
            ));
        }
        html.push_str("</table></div>");
        html
    }
}

#[async_trait]
impl PlanReportPort for HtmlPlanReport {
    async fn render_state_plan(
        &self,
        state: &SearchState,
        context: &PlanContext,
    ) -> ViewResult<String> {
        Ok(self.render(state, context))
    }
}

/// Name from `(define (domain NAME) ...)`.
fn domain_name(domain: &str) -> Option<&str> {
    let start = domain.find("(domain")? + "(domain".len();
    let rest = &domain[start..];
    let end = rest.find(')')?;
    let name = rest[..end].trim();
    (!name.is_empty()).then_some(name)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
