//! Embedded project templates
//!
//! Templates are compiled into the binary so the tool works without any
//! data files next to it. Grafana dashboards are shipped verbatim since
//! their legend formats use the same `{{ }}` delimiters as tera.

use tera::{Context, Tera};

use crate::error::PorosError;

macro_rules! template {
    ($name:literal) => {
        ($name, include_str!(concat!("../../templates/", $name)))
    };
}

// Rendered with the project context
const TEMPLATES: &[(&str, &str)] = &[
    template!("auth_app/models.py.tera"),
    template!("auth_app/admin.py.tera"),
    template!("helpers/__init__.py.tera"),
    template!("helpers/models.py.tera"),
    template!("project/celery.py.tera"),
    template!("docker/Dockerfile.tera"),
    template!("docker/docker-compose.yml.tera"),
    template!("docker/dockerignore.tera"),
    template!("docker/env.example.tera"),
    template!("docker/scripts/dev.sh.tera"),
    template!("docker/scripts/celery_worker.sh.tera"),
    template!("docker/scripts/celery_beat.sh.tera"),
    template!("docker/scripts/flower.sh.tera"),
    template!("docker/nginx/nginx.conf.tera"),
    template!("docker/prometheus/prometheus.yml.tera"),
    template!("docker/prometheus/alert_rules.yml.tera"),
    template!("docker/alertmanager/alertmanager.yml.tera"),
    template!("docker/grafana/datasource.yml.tera"),
    template!("docker/grafana/dashboard.yml.tera"),
];

// Copied as-is
const STATIC_ASSETS: &[(&str, &str)] = &[
    template!("docker/grafana/dashboards/django-app.json"),
    template!("docker/grafana/dashboards/infrastructure.json"),
    template!("docker/grafana/dashboards/celery.json"),
];

/// Renders the embedded templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self, PorosError> {
        Self::from_templates(TEMPLATES.iter().copied())
    }

    /// Build a renderer over an arbitrary template set
    pub fn from_templates<'t>(templates: impl IntoIterator<Item = (&'t str, &'t str)>) -> Result<Self, PorosError> {
        let mut tera = Tera::default();
        // generated files are code and config, never HTML
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(templates).map_err(|e| {
            PorosError::template_render("<embedded>", "Failed to parse templates", Some(e.into()))
        })?;
        Ok(Self { tera })
    }

    /// Render `name` with `context`
    pub fn render(&self, name: &str, context: &Context) -> Result<String, PorosError> {
        self.tera
            .render(name, context)
            .map_err(|e| PorosError::template_render(name, error_chain(&e), Some(e.into())))
    }

    /// Contents of a file shipped verbatim
    pub fn static_asset(&self, name: &str) -> Result<&'static str, PorosError> {
        STATIC_ASSETS
            .iter()
            .find(|(asset, _)| *asset == name)
            .map(|(_, content)| *content)
            .ok_or_else(|| PorosError::template_render(name, "No such static asset", None))
    }
}

/// Context shared by every project template
pub fn project_context(project_name: &str, docker_project_name: &str) -> Context {
    let mut context = Context::new();
    context.insert("project_name", project_name);
    context.insert("docker_project_name", docker_project_name);
    context
}

// tera keeps the useful detail in the source chain
fn error_chain(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_embedded_templates_render() {
        let renderer = TemplateRenderer::new().unwrap();
        let context = project_context("myproject", "mysite");
        for (name, _) in TEMPLATES {
            let rendered = renderer.render(name, &context).unwrap();
            assert!(!rendered.contains("{{ project_name"), "{} left a placeholder", name);
        }
    }

    #[test]
    fn test_render_with_context_variables() {
        let renderer = TemplateRenderer::from_templates([("greeting.tera", "hello {{ project_name }}")]).unwrap();
        let rendered = renderer
            .render("greeting.tera", &project_context("myproject", "myproject"))
            .unwrap();
        assert_eq!(rendered, "hello myproject");
    }

    #[test]
    fn test_render_missing_template_fails() {
        let renderer = TemplateRenderer::new().unwrap();
        let err = renderer.render("missing.tera", &Context::new()).unwrap_err();
        assert!(err.to_string().contains("Failed to render template 'missing.tera'"));
    }

    #[test]
    fn test_render_missing_variable_fails() {
        let renderer = TemplateRenderer::from_templates([("t.tera", "{{ nope }}")]).unwrap();
        assert!(renderer.render("t.tera", &Context::new()).is_err());
    }

    #[test]
    fn test_prometheus_expressions_survive() {
        let renderer = TemplateRenderer::new().unwrap();
        let rendered = renderer
            .render("docker/prometheus/alert_rules.yml.tera", &project_context("p", "site"))
            .unwrap();
        assert!(rendered.contains("{{ $labels.job }}"));
        assert!(rendered.contains("- name: site"));
        assert!(!rendered.contains("raw %}"));
    }

    #[test]
    fn test_static_assets_are_verbatim() {
        let renderer = TemplateRenderer::new().unwrap();
        let dashboard = renderer
            .static_asset("docker/grafana/dashboards/django-app.json")
            .unwrap();
        assert!(dashboard.contains("{{method}}"));
        assert!(renderer.static_asset("docker/grafana/dashboards/nope.json").is_err());
    }
}
