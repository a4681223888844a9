//! Message templates
//!
//! Pure functions from domain entities to HTML text for Telegram. All user
//! supplied text is escaped before it is embedded.

use teloxide::utils::html::escape;

use crate::models::{Form, User, UserStatus};
use crate::telegram::update::TelegramUser;

/// Separates sections of a message
const DELIMITER: &str = "\n\n";

/// Renders every text the bot sends
#[derive(Debug, Clone)]
pub struct Templates {
    site_url: String,
}

impl Templates {
    pub fn new(site_url: &str) -> Self {
        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Website address that logs the holder of `token` in
    pub fn login_url(&self, token: &str) -> String {
        format!("{}/login/{}", self.site_url, token)
    }

    pub fn ping_reply(&self) -> &'static str {
        "pong"
    }

    pub fn start_reply(&self) -> String {
        let mut text = String::new();
        text.push_str("Привет! Я бот, который поможет тебе отправить анкетку в чат.\n");
        text.push_str("Напиши мне /login, чтобы получить ссылку для входа на сайт.");
        text.push_str(DELIMITER);
        text.push_str("<i>Посмотреть свою анкету можно командой /info.</i>");
        text
    }

    pub fn login_reply(&self, token: &str) -> String {
        format!("Вот твоя ссылка для входа:\n{}", escape(&self.login_url(token)))
    }

    pub fn info_no_reply(&self) -> &'static str {
        "Для получения информации об участнике необходимо ответить на его сообщение командой /info"
    }

    pub fn info_no_user(&self) -> &'static str {
        "У меня нет информации об этом пользователе"
    }

    pub fn info_reply(&self, user: &User, form: Option<&Form>) -> String {
        let mut text = String::from("<b>Информация об участнике:</b>");
        text.push_str(DELIMITER);
        match form {
            Some(form) => text.push_str(&self.form_info(form)),
            None => text.push_str(&format!("<b>Имя</b>:\n{}", escape(&user.display_name()))),
        }
        text.push_str(DELIMITER);
        text.push_str(&self.user_link(user.telegram_id));
        text
    }

    /// Form fields, blank optional ones are left out
    pub fn form_info(&self, form: &Form) -> String {
        let mut sections = vec![
            field("Имя", &form.name),
        ];
        if let Some(age) = form.age {
            sections.push(field("Возраст", &age.to_string()));
        }
        sections.push(field("Пол", form.gender.label()));

        let optional = [
            ("О себе", &form.about),
            ("Хобби", &form.hobbies),
            ("Работа", &form.work),
            ("Образование", &form.education),
            ("Почему хочет к нам?", &form.cover_letter),
            ("Контакты", &form.contacts),
        ];
        for (title, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                sections.push(field(title, value));
            }
        }

        sections.join(DELIMITER)
    }

    pub fn user_link(&self, telegram_id: i64) -> String {
        format!(
            "<i>ID <a href=\"tg://user?id={id}\">пользователя</a>: </i><code>{id}</code>",
            id = telegram_id
        )
    }

    /// Form announcement posted to the group before the vote
    pub fn new_form_message(&self, user: &User, form: &Form) -> String {
        let mut text = if user.status == UserStatus::Active {
            format!(
                "<b><a href=\"tg://user?id={}\">Участник</a> изменил анкету:</b>",
                user.telegram_id
            )
        } else {
            "<b>Новая анкета!</b>".to_string()
        };
        text.push_str(DELIMITER);
        text.push_str(&self.form_info(form));
        text.push_str(DELIMITER);
        text.push_str(&self.user_link(user.telegram_id));
        text
    }

    /// Form as shown to the admin together with the decision buttons
    pub fn admin_form_message(&self, user: &User, form: &Form) -> String {
        let mut text = String::from("Новая анкета:");
        text.push_str(DELIMITER);
        text.push_str(&self.form_info(form));
        text.push_str(DELIMITER);
        text.push_str(&self.user_link(user.telegram_id));
        text
    }

    pub fn accept_button(&self) -> &'static str {
        "Принять"
    }

    pub fn reject_button(&self) -> &'static str {
        "Отклонить"
    }

    pub fn poll_question(&self) -> &'static str {
        "Принимаем участника?"
    }

    pub fn poll_options(&self) -> Vec<String> {
        vec!["Да".to_string(), "Нет".to_string()]
    }

    pub fn form_received(&self) -> &'static str {
        "Мы получили твою анкету, она была отправлена на проверку администратором."
    }

    pub fn accept_form_reply(&self, status: UserStatus) -> &'static str {
        if status == UserStatus::Active {
            "Окей, одобрили."
        } else {
            "Привет, твоя анкета одобрена администратором и была отправлена в чат на голосование. Результат ожидай в ближайшие сутки 🙃"
        }
    }

    pub fn reject_form_reply(&self, status: UserStatus) -> &'static str {
        if status == UserStatus::Active {
            "Анкетку отклонили."
        } else {
            self.reject_user_reply()
        }
    }

    pub fn accept_user_reply(&self, invite_link: &str) -> String {
        let mut text = String::from("Ура, твоя анкета была успешно одобрена и мы рады пригласить тебя к нам! 🎉\n");
        text.push_str(&format!("Теперь нажми <a href=\"{}\">сюда</a> и подай заявку на вступление.", escape(invite_link)));
        text
    }

    pub fn reject_user_reply(&self) -> &'static str {
        "Извини, но сейчас мы не готовы принять тебя в чатик. Надеемся, что тебя это не очень расстроило 😥"
    }

    pub fn accept_user_group_reply(&self) -> &'static str {
        "Анкета одобрена, отправил приглашение участнику."
    }

    pub fn reject_user_group_reply(&self) -> &'static str {
        "Анкета отклонена."
    }

    pub fn new_chat_member(&self) -> &'static str {
        "Привет! Добро пожаловать! 🎉"
    }

    pub fn join_request_approved(&self, user: &User) -> String {
        format!(
            "Одобрил заявку на вступление от {}.\n{}",
            escape(&user.display_name()),
            self.user_link(user.telegram_id)
        )
    }

    pub fn join_request_unknown(&self, requester: &TelegramUser) -> String {
        format!(
            "Отклонил заявку на вступление от незнакомого пользователя {}.\n{}",
            escape(&crate::utils::helpers::display_name(&requester.first_name, requester.last_name.as_deref())),
            self.user_link(requester.id)
        )
    }

    pub fn vote_not_started(&self, user: &User) -> String {
        format!(
            "Анкета {} одобрена, но голосование не начато: статус пользователя <code>{}</code>.\n{}",
            escape(&user.display_name()),
            user.status,
            self.user_link(user.telegram_id)
        )
    }

    pub fn user_decision_not_applied(&self, user: &User) -> String {
        format!(
            "Голосование по {} закрыто без решения: статус пользователя <code>{}</code>.\n{}",
            escape(&user.display_name()),
            user.status,
            self.user_link(user.telegram_id)
        )
    }

    pub fn join_request_declined(&self, user: &User) -> String {
        format!(
            "Отклонил заявку на вступление от {}: статус пользователя <code>{}</code>.\n{}",
            escape(&user.display_name()),
            user.status,
            self.user_link(user.telegram_id)
        )
    }
}

fn field(title: &str, value: &str) -> String {
    format!("<b>{}</b>:\n{}", title, escape(value))
}
