//! Location popup
//!
//! The payload built when a marker is clicked: one row per encounter entry
//! that survives the filters, each carrying a sprite, the level/rate/method
//! texts, and a capture checkbox bound to the creature's capture key.
//! Rows are built once per refresh (registering their checkbox surfaces with
//! the store) and the view reads surface state back when it renders.

use iced::widget::image::Handle;
use iced::widget::{button, checkbox, column, container, image, row, scrollable, text};
use iced::{Color, Element, Length};

use crate::capture::store::{capture_key, CaptureStore, SurfaceId};
use crate::data::model::{Dataset, Location};
use crate::filter::predicate::entry_matches;
use crate::filter::resolver::{location_entries, EntrySource};
use crate::filter::state::FilterState;
use crate::sprite::SpriteCache;
use crate::Message;

/// One popup row, ready to render.
pub struct PopupRow {
    pub creature_id: String,
    pub name: String,
    pub sprite: Handle,
    pub level_text: String,
    pub rate_text: String,
    pub method_text: String,
    pub capture_key: String,
    pub surface: SurfaceId,
}

/// The popup payload for one clicked location.
pub struct Popup {
    pub location_id: String,
    pub location_name: String,
    pub rows: Vec<PopupRow>,
}

/// Build the popup payload for a location under the current filters.
pub fn build_popup(
    dataset: &Dataset,
    location: &Location,
    filters: &FilterState,
    captures: &mut CaptureStore,
    sprites: &mut SpriteCache,
) -> Popup {
    let mut rows = Vec::new();

    for (creature_id, entry) in location_entries(dataset, location, filters.version) {
        let Some(creature) = dataset.creature(&creature_id) else {
            continue;
        };
        if !entry_matches(dataset, creature, &entry, filters) {
            continue;
        }

        let key = capture_key(filters.version, &creature_id);
        let surface = captures.register_surface(&key);

        let method_text = entry.method.clone().unwrap_or_else(|| {
            match entry.source {
                EntrySource::Gift => "Gift".to_string(),
                EntrySource::Encounter => String::new(),
            }
        });

        rows.push(PopupRow {
            name: creature.name.clone(),
            sprite: sprites.handle(&creature_id, creature.regional_dex),
            level_text: entry
                .levels
                .map(|levels| format!("Lv. {}", levels.display()))
                .unwrap_or_default(),
            rate_text: entry.rate.clone().unwrap_or_default(),
            method_text,
            capture_key: key,
            surface,
            creature_id,
        });
    }

    Popup {
        location_id: location.id.clone(),
        location_name: location.name.clone(),
        rows,
    }
}

/// Render the popup panel.
pub fn popup_view<'a>(popup: &'a Popup, captures: &CaptureStore) -> Element<'a, Message> {
    let header = row![
        text(&popup.location_name).size(20),
        iced::widget::horizontal_space(),
        button(text("×")).on_press(Message::ClosePopup),
    ]
    .spacing(8)
    .align_y(iced::Alignment::Center);

    let mut rows = column![].spacing(6);

    if popup.rows.is_empty() {
        rows = rows.push(text("Nothing here under the current filters.").size(14));
    }

    for popup_row in &popup.rows {
        let state = captures.surface(popup_row.surface);
        let key = popup_row.capture_key.clone();

        let name_color = if state.dimmed {
            Color::from_rgba(1.0, 1.0, 1.0, 0.4)
        } else {
            Color::WHITE
        };

        let details = column![
            text(&popup_row.name).size(16).color(name_color),
            text(format!(
                "{}  {}  {}",
                popup_row.level_text, popup_row.rate_text, popup_row.method_text
            ))
            .size(12)
            .color(Color::from_rgba(1.0, 1.0, 1.0, if state.dimmed { 0.3 } else { 0.7 })),
        ]
        .spacing(2)
        .width(Length::Fill);

        rows = rows.push(
            row![
                image(popup_row.sprite.clone())
                    .width(Length::Fixed(32.0))
                    .height(Length::Fixed(32.0)),
                details,
                checkbox("", state.checked)
                    .on_toggle(move |caught| Message::CaptureToggled {
                        key: key.clone(),
                        caught,
                    }),
            ]
            .spacing(8)
            .align_y(iced::Alignment::Center),
        );
    }

    container(column![header, scrollable(rows).height(Length::Fill)].spacing(12))
        .padding(12)
        .width(Length::Fixed(300.0))
        .height(Length::Fill)
        .into()
}
