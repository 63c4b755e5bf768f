//! Push notification copy for applied transitions.

use crate::account::domain::Role;
use crate::request::{
    domain::{RequestEvent, RequestStatus, ServiceRequest},
    ports::PushNotification,
};
use minijinja::{Environment, context};

struct Template {
    title: &'static str,
    body: &'static str,
}

const fn copy_for(status: RequestStatus) -> Option<Template> {
    match status {
        RequestStatus::Initiated => None,
        RequestStatus::Assigned => Some(Template {
            title: "Operator assigned",
            body: "An operator accepted your {{ service }} request.",
        }),
        RequestStatus::EnRoute => Some(Template {
            title: "Operator on the way",
            body: "Your operator is heading to {{ pickup }}.",
        }),
        RequestStatus::Active => Some(Template {
            title: "Service started",
            body: "PIN confirmed. Your {{ service }} service is under way.",
        }),
        RequestStatus::Completed => Some(Template {
            title: "Service completed",
            body: "Your {{ service }} service is complete.\
                {% if total %} Total: RD${{ total }}.{% endif %}",
        }),
        RequestStatus::Cancelled => Some(Template {
            title: "Request cancelled",
            body: "The {{ service }} request was cancelled by the {{ cancelled_by }}.\
                {% if reason %} Reason: {{ reason }}{% endif %}",
        }),
    }
}

/// Builds the notification for the party that did not cause `event`.
///
/// Returns `Ok(None)` when nobody needs telling: creation, or a
/// cancellation before any operator was assigned.
pub(crate) fn compose(
    request: &ServiceRequest,
    event: &RequestEvent,
) -> Result<Option<PushNotification>, minijinja::Error> {
    let Some(template) = copy_for(event.to) else {
        return Ok(None);
    };
    let recipient = if event.actor_id == request.user_id() {
        request.operator_id()
    } else {
        Some(request.user_id())
    };
    let Some(recipient_id) = recipient else {
        return Ok(None);
    };

    let cancelled_by = match event.actor_role {
        Role::Operator => "operator",
        Role::User => "customer",
        Role::Admin | Role::Mop => "dispatch team",
    };
    let context = context! {
        service => request.service_type().as_str(),
        pickup => request.pickup().address.as_deref().unwrap_or("your location"),
        total => request.quote().map(|quote| quote.total.to_string()),
        cancelled_by => cancelled_by,
        reason => event.note.as_deref(),
    };
    let body = Environment::new().render_str(template.body, context)?;
    Ok(Some(PushNotification {
        recipient: recipient_id,
        request_id: request.id(),
        title: template.title.to_owned(),
        body,
    }))
}
