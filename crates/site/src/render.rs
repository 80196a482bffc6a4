use std::time::Duration;

use crate::content::{Role, Step, FOOTER, HERO, HOW_IT_WORKS, ROLES};

/// Delay added per list position to the entrance animation.
pub const STAGGER: Duration = Duration::from_millis(100);

pub fn animation_delay(index: usize) -> Duration {
    STAGGER.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
}

fn delay_style(index: usize) -> String {
    format!("animation-delay: {}ms", animation_delay(index).as_millis())
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn render_hero() -> String {
    format!(
        r#"<section class="hero fade-in-up">
  <h1>{title}</h1>
  <p>{subtitle}</p>
  <a class="cta" href="{href}">{label}</a>
</section>"#,
        title = escape_html(HERO.title),
        subtitle = escape_html(HERO.subtitle),
        href = escape_html(HERO.cta_href),
        label = escape_html(HERO.cta_label),
    )
}

fn render_step(index: usize, step: &Step) -> String {
    format!(
        r#"    <li class="step fade-in-up" style="{style}">
      <span class="step-number">{number}</span>
      <h3>{title}</h3>
      <p>{description}</p>
    </li>"#,
        style = delay_style(index),
        number = index + 1,
        title = escape_html(step.title),
        description = escape_html(step.description),
    )
}

pub fn render_how_it_works() -> String {
    let steps = HOW_IT_WORKS
        .iter()
        .enumerate()
        .map(|(index, step)| render_step(index, step))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<section id=\"how-it-works\" class=\"how-it-works\">\n  <h2>How it works</h2>\n  <ol>\n{steps}\n  </ol>\n</section>"
    )
}

fn render_role(index: usize, role: &Role) -> String {
    let capabilities = role
        .capabilities
        .iter()
        .map(|capability| format!("        <li>{}</li>", escape_html(capability)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"    <article class="role fade-in-up" style="{style}">
      <h3>{title}</h3>
      <p>{description}</p>
      <ul>
{capabilities}
      </ul>
    </article>"#,
        style = delay_style(index),
        title = escape_html(role.title),
        description = escape_html(role.description),
    )
}

pub fn render_roles() -> String {
    let roles = ROLES
        .iter()
        .enumerate()
        .map(|(index, role)| render_role(index, role))
        .collect::<Vec<_>>()
        .join("\n");

    format!("<section id=\"roles\" class=\"roles\">\n  <h2>Who it is for</h2>\n{roles}\n</section>")
}

pub fn render_footer() -> String {
    let sections = FOOTER
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let links = section
                .links
                .iter()
                .map(|link| {
                    format!(
                        "        <li><a href=\"{}\">{}</a></li>",
                        escape_html(link.href),
                        escape_html(link.label)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "    <nav class=\"fade-in-up\" style=\"{}\">\n      <h4>{}</h4>\n      <ul>\n{links}\n      </ul>\n    </nav>",
                delay_style(index),
                escape_html(section.title)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let contact = &FOOTER.contact;
    format!(
        r#"<footer class="site-footer">
  <div class="brand">
    <strong>{brand}</strong>
    <p>{blurb}</p>
  </div>
{sections}
  <address>
    <a href="mailto:{email}">{email}</a>
    <span>{phone}</span>
    <span>{address}</span>
  </address>
  <small>&copy; {copyright}</small>
</footer>"#,
        brand = escape_html(FOOTER.brand),
        blurb = escape_html(FOOTER.blurb),
        email = escape_html(contact.email),
        phone = escape_html(contact.phone),
        address = escape_html(contact.address),
        copyright = escape_html(FOOTER.copyright),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <style>
    .fade-in-up {{ opacity: 0; animation: fade-in-up 0.5s ease-out forwards; }}
    @keyframes fade-in-up {{ from {{ opacity: 0; transform: translateY(20px); }} to {{ opacity: 1; transform: none; }} }}
  </style>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape_html(title),
    )
}

pub fn render_landing_page() -> String {
    let body = [
        render_hero(),
        render_how_it_works(),
        render_roles(),
        render_footer(),
    ]
    .join("\n");
    page(FOOTER.brand, &body)
}

/// Login page with the email field pre-filled. The password is never echoed.
pub fn render_login_page(email: &str, notice: Option<&str>) -> String {
    let notice = notice
        .map(|message| format!("    <p class=\"notice\" role=\"alert\">{}</p>\n", escape_html(message)))
        .unwrap_or_default();

    let body = format!(
        r#"<main class="login fade-in-up">
  <h1>Sign in to {brand}</h1>
  <form method="post" action="/login">
{notice}    <label for="email">Email</label>
    <input id="email" name="email" type="email" value="{email}" required>
    <label for="password">Password</label>
    <input id="password" name="password" type="password" required>
    <button type="submit">Sign in</button>
  </form>
</main>"#,
        brand = escape_html(FOOTER.brand),
        email = escape_html(email),
    );
    page("Sign in", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_by_one_hundred_milliseconds_per_item() {
        assert_eq!(animation_delay(0), Duration::ZERO);
        assert_eq!(animation_delay(1), Duration::from_millis(100));
        assert_eq!(animation_delay(3), Duration::from_millis(300));
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn every_step_is_rendered_with_its_own_delay() {
        let html = render_how_it_works();

        assert_eq!(html.matches("<li class=\"step").count(), HOW_IT_WORKS.len());
        for index in 0..HOW_IT_WORKS.len() {
            assert!(html.contains(&format!("animation-delay: {}ms", index * 100)));
        }
        assert!(html.contains("Schedule a session"));
    }

    #[test]
    fn roles_list_their_capabilities() {
        let html = render_roles();

        assert_eq!(html.matches("<article class=\"role").count(), ROLES.len());
        for role in ROLES {
            for capability in role.capabilities {
                assert!(html.contains(capability));
            }
        }
    }

    #[test]
    fn footer_carries_links_and_contact() {
        let html = render_footer();

        assert!(html.contains("href=\"/login\""));
        assert!(html.contains("mailto:support@inubesolutions.com"));
        assert!(html.contains("style=\"animation-delay: 100ms\""));
    }

    #[test]
    fn rendering_is_stateless() {
        assert_eq!(render_landing_page(), render_landing_page());
    }

    #[test]
    fn landing_page_assembles_sections_in_order() {
        let html = render_landing_page();

        let hero = html.find("class=\"hero").unwrap();
        let steps = html.find("id=\"how-it-works\"").unwrap();
        let roles = html.find("id=\"roles\"").unwrap();
        let footer = html.find("<footer").unwrap();
        assert!(hero < steps && steps < roles && roles < footer);
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn login_page_escapes_prefill_and_notice() {
        let html = render_login_page("a\"b@example.com", Some("<b>nope</b>"));

        assert!(html.contains("value=\"a&quot;b@example.com\""));
        assert!(html.contains("&lt;b&gt;nope&lt;/b&gt;"));
        assert!(html.contains("action=\"/login\""));
        assert!(html.contains("name=\"password\" type=\"password\""));
    }

    #[test]
    fn login_page_without_notice_has_no_alert() {
        assert!(!render_login_page("", None).contains("role=\"alert\""));
    }
}
