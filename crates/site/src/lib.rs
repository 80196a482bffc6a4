//! Public pages of the LiveStream site.
//!
//! Content is fixed at compile time in [`content`]; the `render_*`
//! functions turn it into HTML. List items fade in one after another,
//! each delayed by [`STAGGER`] times its position.

pub mod content;
mod render;

pub use content::{FOOTER, HERO, HOW_IT_WORKS, ROLES};
pub use render::{
    animation_delay, escape_html, render_footer, render_hero, render_how_it_works,
    render_landing_page, render_login_page, render_roles, STAGGER,
};
