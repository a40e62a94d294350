//! Request handlers for the car use cases.
//!
//! Handlers are synchronous and transport-agnostic. Each one receives the
//! request's own [`Storage`] connection and the client's [`Session`]
//! explicitly and returns an [`Outcome`] telling the transport what to send
//! back. Storage failures are returned as errors and are not handled here.

use tracing::{debug, info};

use crate::car::CarForm;
use crate::error::Result;
use crate::session::Session;
use crate::storage::Storage;
use crate::validation::{FormKind, ValidationError, Validator};
use crate::views::View;

/// Path of the car list; every mutation redirects here.
pub const LIST_PATH: &str = "/auta";

/// Flash shown after a car was created.
pub const CREATED_MESSAGE: &str = "Auto bylo úspěšně přidáno.";

/// Flash shown after a car was updated.
pub const UPDATED_MESSAGE: &str = "Auto bylo aktualizováno.";

/// Flash shown after a car was deleted.
pub const DELETED_MESSAGE: &str = "Auto bylo smazáno.";

/// Flash shown when deleting a car that does not exist.
pub const DELETE_MISSING_MESSAGE: &str = "Auto nebylo nalezeno.";

/// Inline body returned when editing a car that does not exist.
pub const EDIT_MISSING_BODY: &str = "Auto nenalezeno";

/// What the transport should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Render a page. Queued flashes are drained into it.
    Page(View),
    /// Redirect to a path. Flashes stay queued for the next page.
    Redirect(&'static str),
    /// Plain-text 404 response, bypassing the not-found page.
    Missing(&'static str),
}

/// Landing page.
#[must_use]
pub fn home() -> Outcome {
    Outcome::Page(View::Home)
}

/// Page for unmatched routes.
#[must_use]
pub fn not_found() -> Outcome {
    Outcome::Page(View::NotFound)
}

/// List every car.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list(store: &Storage, session: &Session) -> Result<Outcome> {
    let cars = store.list_all()?;
    Ok(Outcome::Page(View::List {
        cars,
        last_created_car_name: session.last_created_car_name().map(str::to_string),
    }))
}

/// Empty "new car" form.
#[must_use]
pub fn create_form() -> Outcome {
    Outcome::Page(View::Create)
}

/// Handle a "new car" submission.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn create_submit(
    store: &Storage,
    session: &mut Session,
    validator: &Validator,
    form: &CarForm,
) -> Result<Outcome> {
    let draft = match validator.validate(&form.trimmed()) {
        Ok(draft) => draft,
        Err(errors) => {
            flash_errors(session, &errors, FormKind::Create);
            return Ok(Outcome::Page(View::Create));
        }
    };

    let id = store.insert(&draft)?;
    info!("Created car {} ({})", id, draft.name);

    session.set_last_created_car_name(draft.name);
    session.flash(CREATED_MESSAGE);
    Ok(Outcome::Redirect(LIST_PATH))
}

/// "Edit car" form for an existing record.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn edit_form(store: &Storage, id: i64) -> Result<Outcome> {
    match store.get(id)? {
        Some(car) => Ok(Outcome::Page(View::Edit { car })),
        None => Ok(missing_for_edit(id)),
    }
}

/// Handle an "edit car" submission.
///
/// On validation failure the form is shown again with the stored record,
/// not the submitted values.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub fn edit_submit(
    store: &Storage,
    session: &mut Session,
    validator: &Validator,
    id: i64,
    form: &CarForm,
) -> Result<Outcome> {
    let Some(car) = store.get(id)? else {
        return Ok(missing_for_edit(id));
    };

    let draft = match validator.validate(&form.trimmed()) {
        Ok(draft) => draft,
        Err(errors) => {
            flash_errors(session, &errors, FormKind::Edit);
            return Ok(Outcome::Page(View::Edit { car }));
        }
    };

    store.update(id, &draft)?;
    info!("Updated car {}", id);

    session.flash(UPDATED_MESSAGE);
    Ok(Outcome::Redirect(LIST_PATH))
}

/// Delete a car without confirmation.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub fn delete(store: &Storage, session: &mut Session, id: i64) -> Result<Outcome> {
    if store.get(id)?.is_none() {
        debug!("Delete requested for missing car {}", id);
        session.flash(DELETE_MISSING_MESSAGE);
        return Ok(Outcome::Redirect(LIST_PATH));
    }

    store.delete(id)?;
    info!("Deleted car {}", id);

    session.flash(DELETED_MESSAGE);
    Ok(Outcome::Redirect(LIST_PATH))
}

fn missing_for_edit(id: i64) -> Outcome {
    debug!("Edit requested for missing car {}", id);
    Outcome::Missing(EDIT_MISSING_BODY)
}

fn flash_errors(session: &mut Session, errors: &[ValidationError], form: FormKind) {
    debug!("Rejected {:?} submission: {:?}", form, errors);
    for error in errors {
        session.flash(error.message(form));
    }
}
