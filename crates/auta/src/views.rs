//! HTML pages.
//!
//! Each [`View`] is rendered into a shared layout that also shows the flash
//! messages drained for this response. All user-supplied text is escaped.

use std::fmt::Write as _;

use crate::car::Car;

/// A page the application can render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Landing page.
    Home,
    /// All cars plus the name of the last one this client created.
    List {
        /// Every stored car.
        cars: Vec<Car>,
        /// From the session; not cleared by viewing.
        last_created_car_name: Option<String>,
    },
    /// Empty "new car" form.
    Create,
    /// "Edit car" form filled with the stored record.
    Edit {
        /// The record being edited.
        car: Car,
    },
    /// Page for unmatched routes.
    NotFound,
}

impl View {
    /// Template-style name, used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::List { .. } => "index",
            Self::Create => "create",
            Self::Edit { .. } => "edit",
            Self::NotFound => "404",
        }
    }

    /// Whether this page is served with a 404 status.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Render a view together with the flash messages for this response.
#[must_use]
pub fn render(view: &View, flashes: &[String]) -> String {
    let (title, body) = match view {
        View::Home => ("Autosalon", home_body()),
        View::List {
            cars,
            last_created_car_name,
        } => ("Seznam aut", list_body(cars, last_created_car_name.as_deref())),
        View::Create => ("Přidat auto", car_form("/create", "Přidat", None)),
        View::Edit { car } => (
            "Upravit auto",
            car_form(&format!("/edit/{}", car.id), "Uložit", Some(car)),
        ),
        View::NotFound => ("Stránka nenalezena", not_found_body()),
    };
    layout(title, flashes, &body)
}

fn layout(title: &str, flashes: &[String], body: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!doctype html>\n<html lang=\"cs\">\n<head>\n  <meta charset=\"utf-8\"/>\n  \
         <title>{}</title>\n</head>\n<body>\n  <nav><a href=\"/\">Domů</a> | \
         <a href=\"/auta\">Auta</a> | <a href=\"/create\">Přidat auto</a></nav>\n",
        escape(title)
    );
    if !flashes.is_empty() {
        html.push_str("  <ul class=\"flashes\">\n");
        for message in flashes {
            let _ = writeln!(html, "    <li>{}</li>", escape(message));
        }
        html.push_str("  </ul>\n");
    }
    let _ = write!(html, "  <h1>{}</h1>\n{body}</body>\n</html>\n", escape(title));
    html
}

fn home_body() -> String {
    "  <p>Evidence aut. Pokračujte na <a href=\"/auta\">seznam aut</a>.</p>\n".to_string()
}

fn list_body(cars: &[Car], last_created_car_name: Option<&str>) -> String {
    let mut html = String::new();
    if let Some(name) = last_created_car_name {
        let _ = writeln!(
            html,
            "  <p class=\"last-created\">Naposledy přidané auto: {}</p>",
            escape(name)
        );
    }
    if cars.is_empty() {
        html.push_str("  <p>Zatím žádná auta.</p>\n");
        return html;
    }

    html.push_str(
        "  <table>\n    <tr><th>Název</th><th>Popis</th><th>Datum uvedení</th>\
         <th>Cena</th><th>Barva</th><th></th></tr>\n",
    );
    for car in cars {
        let _ = writeln!(
            html,
            "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/edit/{id}\">Upravit</a> <a href=\"/delete/{id}\">Smazat</a></td></tr>",
            escape(&car.name),
            escape(&car.description),
            escape(&car.release_date),
            escape(car.price.as_deref().unwrap_or("")),
            escape(car.color.as_deref().unwrap_or("")),
            id = car.id,
        );
    }
    html.push_str("  </table>\n");
    html
}

fn car_form(action: &str, submit: &str, car: Option<&Car>) -> String {
    let name = car.map_or("", |c| c.name.as_str());
    let description = car.map_or("", |c| c.description.as_str());
    let release_date = car.map_or("", |c| c.release_date.as_str());
    let price = car.and_then(|c| c.price.as_deref()).unwrap_or("");
    let color = car.and_then(|c| c.color.as_deref()).unwrap_or("");

    let mut html = String::new();
    let _ = writeln!(html, "  <form method=\"post\" action=\"{}\">", escape(action));
    let _ = writeln!(
        html,
        "    <label>Název <input name=\"nazev\" maxlength=\"30\" value=\"{}\"/></label>",
        escape(name)
    );
    let _ = writeln!(
        html,
        "    <label>Popis <textarea name=\"popis\" maxlength=\"500\">{}</textarea></label>",
        escape(description)
    );
    let _ = writeln!(
        html,
        "    <label>Datum uvedení <input name=\"datum\" type=\"date\" value=\"{}\"/></label>",
        escape(release_date)
    );
    let _ = writeln!(
        html,
        "    <label>Cena <input name=\"cena\" value=\"{}\"/></label>",
        escape(price)
    );
    let _ = writeln!(
        html,
        "    <label>Barva <input name=\"barva\" placeholder=\"#ff0000\" value=\"{}\"/></label>",
        escape(color)
    );
    let _ = writeln!(html, "    <button type=\"submit\">{}</button>", escape(submit));
    html.push_str("  </form>\n");
    html
}

fn not_found_body() -> String {
    "  <p>Požadovaná stránka neexistuje. <a href=\"/\">Zpět na úvod</a>.</p>\n".to_string()
}

/// Escape text for use in HTML content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
