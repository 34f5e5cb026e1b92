use actix_web::{body::BoxBody, cookie::Cookie, http::StatusCode, HttpRequest, HttpResponse, Responder};
use std::borrow::Cow;

#[derive(serde::Serialize)]
pub struct SuccessData<T: serde::Serialize> {
    pub data: Option<T>,
    pub message: Option<Cow<'static, str>>,
}

/// Response envelope for every successful handler: `{"data": ..., "message": ...}`.
pub struct Success<T: serde::Serialize> {
    pub status: StatusCode,
    pub body: Option<SuccessData<T>>,
    pub cookies: Vec<Cookie<'static>>,
}

impl<T: serde::Serialize> Success<T> {
    fn with_status(status: StatusCode, data: Option<T>) -> Self {
        Self { status, body: Some(SuccessData { data, message: None }), cookies: Vec::new() }
    }

    pub fn ok(data: Option<T>) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: Option<T>) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    pub fn no_content() -> Self {
        Self { status: StatusCode::NO_CONTENT, body: None, cookies: Vec::new() }
    }

    pub fn message<M>(mut self, msg: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        if let Some(body) = &mut self.body {
            body.message = Some(msg.into());
        }
        self
    }

    pub fn cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }
}

impl<T: serde::Serialize> Responder for Success<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        let mut response = HttpResponse::build(self.status);

        for cookie in self.cookies {
            response.cookie(cookie);
        }

        match self.body {
            Some(body) => response.json(body),
            None => response.finish(),
        }
    }
}
