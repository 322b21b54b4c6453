//! Message bodies rendered locally with Handlebars. Anything the mail
//! provider renders from its own templates lives there instead.
//!
//! Strict mode is on so a missing variable fails loudly instead of
//! rendering an empty string.

use std::fmt;

use handlebars::Handlebars;

#[derive(Debug)]
pub enum Template {
    FirstResponseSubject,
    FirstResponseBody,
    EventCreated,
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// Triple braces skip HTML escaping for text that isn't HTML
const FIRST_RESPONSE_SUBJECT: &str = r#"Someone just responded to your poll - "{{{eventName}}}"!"#;

const FIRST_RESPONSE_BODY: &str = r#"<p>Hi {{ownerFirstName}},</p>

<p>{{respondentName}} just responded to your poll named "{{eventName}}"!<br>
<a href="{{eventUrl}}">Click here to view the event</a></p>

<p>Best,<br>
The huddle team</p>"#;

const EVENT_CREATED: &str = r"*New event created!* :tada:

*Event url*: {{{eventUrl}}}
*Creator*: {{{creator}}}
*Num days*: {{numDates}}
*Type*: {{eventType}}";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_template_string(
            &Template::FirstResponseSubject.to_string(),
            FIRST_RESPONSE_SUBJECT,
        )
        .expect("Failed to register template");
    registry
        .register_template_string(&Template::FirstResponseBody.to_string(), FIRST_RESPONSE_BODY)
        .expect("Failed to register template");
    registry
        .register_template_string(&Template::EventCreated.to_string(), EVENT_CREATED)
        .expect("Failed to register template");
    registry
}
