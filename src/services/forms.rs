//! Form service
//!
//! Entry points the website uses for membership forms: submission, the
//! member's own profile and the directory of accepted members.

use std::sync::Arc;
use tracing::info;
use crate::database::Database;
use crate::models::{Form, NewForm, User};
use crate::services::Templates;
use crate::telegram::callback_data::{AdminCallback, AdminEntity};
use crate::telegram::outgoing::Outgoing;
use crate::telegram::sender::SenderHandle;
use crate::utils::errors::{ClubGateError, Result};
use crate::utils::helpers::non_blank;

#[derive(Clone)]
pub struct FormService {
    db: Arc<dyn Database>,
    sender: SenderHandle,
    templates: Templates,
    admin_id: i64,
}

impl FormService {
    pub fn new(db: Arc<dyn Database>, sender: SenderHandle, templates: Templates, admin_id: i64) -> Self {
        Self {
            db,
            sender,
            templates,
            admin_id,
        }
    }

    /// Store a new form and put it in front of the admin
    pub async fn submit(&self, user: &User, form: NewForm) -> Result<Form> {
        if form.user_telegram_id != user.telegram_id {
            return Err(ClubGateError::PermissionDenied("form belongs to another user".to_string()));
        }
        if form.name.trim().is_empty() {
            return Err(ClubGateError::InvalidInput("name is required".to_string()));
        }

        let form = self.db.create_form(normalize(form)).await?;
        info!(form_id = form.id, telegram_id = user.telegram_id, "Form submitted");

        self.sender
            .send(Outgoing::text(user.telegram_id, self.templates.form_received()))
            .await?;
        self.sender
            .send(Outgoing::with_keyboard(
                self.admin_id,
                self.templates.admin_form_message(user, &form),
                AdminCallback::decision_keyboard(
                    AdminEntity::Form,
                    form.id,
                    self.templates.accept_button(),
                    self.templates.reject_button(),
                ),
            ))
            .await?;

        Ok(form)
    }

    /// The member's latest form, decided or not
    pub async fn profile(&self, telegram_id: i64) -> Result<Option<Form>> {
        self.db.get_last_form(telegram_id).await
    }

    /// Accepted forms of all current members
    pub async fn directory(&self) -> Result<Vec<(Form, User)>> {
        self.db.list_accepted_forms().await
    }
}

fn normalize(form: NewForm) -> NewForm {
    NewForm {
        name: form.name.trim().to_string(),
        about: non_blank(form.about),
        hobbies: non_blank(form.hobbies),
        work: non_blank(form.work),
        education: non_blank(form.education),
        cover_letter: non_blank(form.cover_letter),
        contacts: non_blank(form.contacts),
        ..form
    }
}
