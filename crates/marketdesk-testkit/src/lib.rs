// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use marketdesk_app::{
    Buyer, BuyerId, Field, FieldCategory, FieldId, FieldType, PartyStatus, Seller, SellerId,
};
use std::io::Read;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use time::{Date, Duration, Month, OffsetDateTime, Time};

const FIRST_NAMES: [&str; 16] = [
    "Ada", "Bo", "Cyrus", "Dana", "Eli", "Farah", "Gus", "Hana", "Ivo", "Jun", "Kira", "Lev",
    "Mina", "Noor", "Otto", "Pia",
];

const LAST_NAMES: [&str; 12] = [
    "Adler", "Baptiste", "Chen", "Diaz", "Eriksen", "Fong", "Garcia", "Haddad", "Iyer", "Jensen",
    "Kowalski", "Lund",
];

const DOMAINS: [&str; 5] = [
    "example.com",
    "market.test",
    "traders.net",
    "wholesale.io",
    "brokers.org",
];

const FIELD_TITLES: [&str; 10] = [
    "Budget",
    "Asking price",
    "Preferred contact time",
    "Company size",
    "Delivery window",
    "Payment terms",
    "Region",
    "Certifications",
    "Notes",
    "Product catalog",
];

const FIELD_DESCRIPTIONS: [&str; 6] = [
    "Shown on the profile page",
    "Used when matching parties",
    "Free-form text from the intake call",
    "Collected during onboarding",
    "Optional, may be left blank",
    "Attach a supporting document",
];

const ABOUT_LINES: [&str; 5] = [
    "Repeat customer since the spring fair.",
    "Prefers email over phone.",
    "Asked for a volume discount.",
    "Referred by an existing seller.",
    "Follow up after the quarterly review.",
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible buyer, seller, and field records.
#[derive(Debug, Clone)]
pub struct MarketFaker {
    rng: DeterministicRng,
    next_id: u64,
}

impl MarketFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    /// Mongo-style 24 hex digit id, unique per faker.
    fn object_id(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        format!("{:08x}{:016x}", 0x6650_0000_u32, id)
    }

    fn person(&mut self) -> (String, String, String) {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&DOMAINS);
        let phone = format!(
            "({:03}) {:03}-{:04}",
            200 + self.rng.int_n(800),
            200 + self.rng.int_n(800),
            self.rng.int_n(10_000),
        );
        (
            format!("{first} {last}"),
            format!(
                "{}.{}@{domain}",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase()
            ),
            phone,
        )
    }

    fn status(&mut self) -> Option<PartyStatus> {
        let index = self.rng.int_n(PartyStatus::ALL.len() + 1);
        PartyStatus::ALL.get(index).copied()
    }

    fn timestamps(&mut self) -> (OffsetDateTime, OffsetDateTime) {
        let created = reference_now() + Duration::hours(self.rng.int_n(24 * 180) as i64);
        let updated = created + Duration::minutes(self.rng.int_n(60 * 24 * 30) as i64);
        (created, updated)
    }

    pub fn buyer(&mut self) -> Buyer {
        let (name, email, phone) = self.person();
        let (created_at, updated_at) = self.timestamps();
        Buyer {
            id: BuyerId::new(self.object_id()),
            name,
            email,
            phone,
            status: self.status(),
            about: self.pick(&ABOUT_LINES).to_owned(),
            created_at,
            updated_at,
        }
    }

    pub fn seller(&mut self) -> Seller {
        let (name, email, phone) = self.person();
        let (created_at, updated_at) = self.timestamps();
        Seller {
            id: SellerId::new(self.object_id()),
            name,
            email,
            phone,
            status: self.status(),
            about: self.pick(&ABOUT_LINES).to_owned(),
            created_at,
            updated_at,
        }
    }

    pub fn field(&mut self) -> Field {
        let (created_at, updated_at) = self.timestamps();
        Field {
            id: FieldId::new(self.object_id()),
            title: self.pick(&FIELD_TITLES).to_owned(),
            description: self.pick(&FIELD_DESCRIPTIONS).to_owned(),
            category: Some(FieldCategory::ALL[self.rng.int_n(FieldCategory::ALL.len())]),
            field_type: Some(FieldType::ALL[self.rng.int_n(FieldType::ALL.len())]),
            created_at,
            updated_at,
            revision: Some(0),
        }
    }

    pub fn buyers(&mut self, count: usize) -> Vec<Buyer> {
        (0..count).map(|_| self.buyer()).collect()
    }

    pub fn sellers(&mut self, count: usize) -> Vec<Seller> {
        (0..count).map(|_| self.seller()).collect()
    }

    pub fn fields(&mut self, count: usize) -> Vec<Field> {
        (0..count).map(|_| self.field()).collect()
    }
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

fn reference_now() -> OffsetDateTime {
    let date =
        Date::from_calendar_date(REFERENCE_YEAR, Month::January, 1).expect("valid calendar date");
    date.with_time(Time::MIDNIGHT).assume_utc()
}

/// One scripted reply of a [`MockApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRoute {
    pub method: &'static str,
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl MockRoute {
    pub fn json(method: &'static str, path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method,
            path: path.into(),
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(method: &'static str, path: impl Into<String>, status: u16, body: &str) -> Self {
        Self {
            method,
            path: path.into(),
            status,
            body: body.to_owned(),
        }
    }
}

/// What the mock server actually received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.body).context("decode recorded request body")
    }
}

/// A `tiny_http` server answering each scripted route once, in order.
pub struct MockApi {
    base_url: String,
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl MockApi {
    pub fn serve(routes: Vec<MockRoute>) -> Result<Self> {
        let server = tiny_http::Server::http("127.0.0.1:0")
            .map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            let mut recorded = Vec::with_capacity(routes.len());
            for route in routes {
                let mut request = server.recv().expect("request expected");
                let mut body = String::new();
                request
                    .as_reader()
                    .read_to_string(&mut body)
                    .expect("read request body");
                let content_type = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Content-Type"))
                    .map(|header| header.value.as_str().to_owned());
                let seen = RecordedRequest {
                    method: request.method().as_str().to_ascii_uppercase(),
                    path: request.url().to_owned(),
                    content_type,
                    body,
                };
                assert_eq!(seen.method, route.method, "method for {}", route.path);
                assert_eq!(seen.path, route.path);
                recorded.push(seen);

                let response = tiny_http::Response::from_string(route.body)
                    .with_status_code(route.status)
                    .with_header(
                        tiny_http::Header::from_bytes("Content-Type", "application/json")
                            .expect("valid content type header"),
                    );
                request.respond(response).expect("response should succeed");
            }
            recorded
        });

        Ok(Self { base_url, handle })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for every route to be served and returns what was received.
    pub fn finish(self) -> Result<Vec<RecordedRequest>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("mock server thread panicked"))
    }
}

/// Wire JSON for a record, as the upstream API would return it.
pub fn wire<T: serde::Serialize>(record: &T) -> serde_json::Value {
    serde_json::to_value(record).expect("fixture serializes")
}
