// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Weekday and month names, looked up by language code.

/// Immutable name tables for one language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Locale {
    /// Lowercase ISO 639-1 code.
    pub code: &'static str,
    /// Sunday first.
    pub weekdays: [&'static str; 7],
    /// January first.
    pub months: [&'static str; 12],
}

/// Used when a code is not in [`LOCALES`].
pub const ENGLISH: Locale = Locale {
    code: "en",
    weekdays: [
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
    ],
    months: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
};

/// Every built-in table.
pub const LOCALES: &[Locale] = &[
    ENGLISH,
    Locale {
        code: "de",
        weekdays: [
            "Sonntag",
            "Montag",
            "Dienstag",
            "Mittwoch",
            "Donnerstag",
            "Freitag",
            "Samstag",
        ],
        months: [
            "Januar",
            "Februar",
            "März",
            "April",
            "Mai",
            "Juni",
            "Juli",
            "August",
            "September",
            "Oktober",
            "November",
            "Dezember",
        ],
    },
    Locale {
        code: "fr",
        weekdays: [
            "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
        ],
        months: [
            "janvier",
            "février",
            "mars",
            "avril",
            "mai",
            "juin",
            "juillet",
            "août",
            "septembre",
            "octobre",
            "novembre",
            "décembre",
        ],
    },
    Locale {
        code: "es",
        weekdays: [
            "domingo",
            "lunes",
            "martes",
            "miércoles",
            "jueves",
            "viernes",
            "sábado",
        ],
        months: [
            "enero",
            "febrero",
            "marzo",
            "abril",
            "mayo",
            "junio",
            "julio",
            "agosto",
            "septiembre",
            "octubre",
            "noviembre",
            "diciembre",
        ],
    },
    Locale {
        code: "it",
        weekdays: [
            "domenica",
            "lunedì",
            "martedì",
            "mercoledì",
            "giovedì",
            "venerdì",
            "sabato",
        ],
        months: [
            "gennaio",
            "febbraio",
            "marzo",
            "aprile",
            "maggio",
            "giugno",
            "luglio",
            "agosto",
            "settembre",
            "ottobre",
            "novembre",
            "dicembre",
        ],
    },
    Locale {
        code: "nl",
        weekdays: [
            "zondag",
            "maandag",
            "dinsdag",
            "woensdag",
            "donderdag",
            "vrijdag",
            "zaterdag",
        ],
        months: [
            "januari",
            "februari",
            "maart",
            "april",
            "mei",
            "juni",
            "juli",
            "augustus",
            "september",
            "oktober",
            "november",
            "december",
        ],
    },
    Locale {
        code: "pt",
        weekdays: [
            "domingo",
            "segunda-feira",
            "terça-feira",
            "quarta-feira",
            "quinta-feira",
            "sexta-feira",
            "sábado",
        ],
        months: [
            "janeiro",
            "fevereiro",
            "março",
            "abril",
            "maio",
            "junho",
            "julho",
            "agosto",
            "setembro",
            "outubro",
            "novembro",
            "dezembro",
        ],
    },
];

impl Locale {
    /// Table for `code` (case-insensitive, region suffix ignored, so `"de-AT"`
    /// finds German). Falls back to [`ENGLISH`].
    pub fn lookup(code: &str) -> &'static Locale {
        let lang = code.split(['-', '_']).next().unwrap_or(code);
        LOCALES
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(lang))
            .unwrap_or(&LOCALES[0])
    }

    /// Weekday name, Sunday = 0. Out-of-range indices wrap.
    pub fn weekday(&self, index: u8) -> &'static str {
        self.weekdays[(index % 7) as usize]
    }

    /// Month name, January = 1. Returns `""` outside `1..=12`.
    pub fn month(&self, month: u8) -> &'static str {
        match month {
            1..=12 => self.months[(month - 1) as usize],
            _ => "",
        }
    }
}
