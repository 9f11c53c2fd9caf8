//! Filter sidebar and creature list
//!
//! The sidebar mutates nothing itself: every widget emits a message and the
//! application applies it to its filter snapshot, then refreshes. The list
//! is the derived view over the same predicate as the map markers, in
//! regional-dex order, with a jump-to-location control per row.

use iced::widget::image::Handle;
use iced::widget::{
    button, checkbox, column, container, image, pick_list, row, scrollable, text,
};
use iced::{Color, Element, Length};
use iced_aw::Wrap;

use crate::capture::store::{capture_key, CaptureStore, SurfaceId};
use crate::data::model::{Dataset, Version};
use crate::filter::predicate::{creature_matches, entry_matches};
use crate::filter::resolver::resolve_entries;
use crate::filter::state::{FilterState, Method, Rod};
use crate::sprite::SpriteCache;
use crate::Message;

/// One creature list row, ready to render.
pub struct ListRow {
    pub creature_id: String,
    pub name: String,
    pub regional_dex: u32,
    pub types_text: String,
    pub sprite: Handle,
    pub capture_key: String,
    pub surface: SurfaceId,
    /// First matching location, target of the jump control.
    pub first_location: Option<String>,
}

/// Build the derived creature list under the current filters.
pub fn build_list(
    dataset: &Dataset,
    filters: &FilterState,
    captures: &mut CaptureStore,
    sprites: &mut SpriteCache,
) -> Vec<ListRow> {
    let mut rows = Vec::new();

    for creature in &dataset.creatures {
        if !creature_matches(dataset, creature, filters) {
            continue;
        }

        let first_location = resolve_entries(dataset, &creature.id, filters.version)
            .into_iter()
            .find(|entry| entry_matches(dataset, creature, entry, filters))
            .map(|entry| entry.location_id);

        let key = capture_key(filters.version, &creature.id);
        let surface = captures.register_surface(&key);

        rows.push(ListRow {
            creature_id: creature.id.clone(),
            name: creature.name.clone(),
            regional_dex: creature.regional_dex,
            types_text: creature.types.join(" / "),
            sprite: sprites.handle(&creature.id, creature.regional_dex),
            capture_key: key,
            surface,
            first_location,
        });
    }

    rows
}

/// Render the filter sidebar.
pub fn filter_panel<'a>(
    filters: &'a FilterState,
    known_types: &'a [String],
    captures: &CaptureStore,
) -> Element<'a, Message> {
    let version_row = row![
        text("Version").size(14),
        pick_list(&Version::ALL[..], Some(filters.version), Message::VersionSelected),
    ]
    .spacing(8)
    .align_y(iced::Alignment::Center);

    let toggles = column![
        checkbox("Obtainable only", filters.obtainable_only)
            .on_toggle(Message::ObtainableOnlyToggled),
        checkbox("Starters only", filters.starter_only).on_toggle(Message::StarterOnlyToggled),
        checkbox("Gifts only", filters.gift_only).on_toggle(Message::GiftOnlyToggled),
    ]
    .spacing(6);

    let mut type_section = column![
        checkbox("Filter by type", filters.types_enabled).on_toggle(Message::TypesEnabledToggled),
    ]
    .spacing(6);

    if filters.types_enabled {
        let chips: Vec<Element<'a, Message>> = known_types
            .iter()
            .map(|tag| {
                let selected = filters.selected_types.contains(tag);
                button(text(tag.as_str()).size(12))
                    .style(if selected {
                        button::primary
                    } else {
                        button::secondary
                    })
                    .on_press(Message::TypeChipToggled(tag.clone()))
                    .padding(4)
                    .into()
            })
            .collect();
        type_section = type_section.push(Wrap::with_elements(chips).spacing(4.0).line_spacing(4.0));
    }

    let mut method_section = column![
        checkbox("Filter by method", filters.method_enabled)
            .on_toggle(Message::MethodEnabledToggled),
    ]
    .spacing(6);

    if filters.method_enabled {
        method_section = method_section.push(pick_list(
            &Method::ALL[..],
            Some(filters.method),
            Message::MethodSelected,
        ));
        // The rod sub-filter only means anything while fishing.
        if filters.method == Method::Fishing {
            method_section = method_section.push(pick_list(
                &Rod::ALL[..],
                Some(filters.rod),
                Message::RodSelected,
            ));
        }
    }

    let caught = captures.caught_count(filters.version);
    let footer = column![
        text(format!("{} caught in {}", caught, filters.version)).size(12),
        button(text("Reset filters").size(12)).on_press(Message::FiltersReset),
    ]
    .spacing(8);

    container(
        column![version_row, toggles, type_section, method_section, footer].spacing(16),
    )
    .padding(12)
    .width(Length::Fixed(220.0))
    .height(Length::Fill)
    .into()
}

/// Render the derived creature list.
pub fn list_view<'a>(rows: &'a [ListRow], captures: &CaptureStore) -> Element<'a, Message> {
    let mut list = column![].spacing(6);

    if rows.is_empty() {
        list = list.push(text("No creatures match the current filters.").size(14));
    }

    for list_row in rows {
        let state = captures.surface(list_row.surface);
        let key = list_row.capture_key.clone();

        let name_color = if state.dimmed {
            Color::from_rgba(1.0, 1.0, 1.0, 0.4)
        } else {
            Color::WHITE
        };

        let details = column![
            text(format!("#{:03} {}", list_row.regional_dex, list_row.name))
                .size(14)
                .color(name_color),
            text(&list_row.types_text)
                .size(11)
                .color(Color::from_rgba(1.0, 1.0, 1.0, if state.dimmed { 0.3 } else { 0.6 })),
        ]
        .spacing(2)
        .width(Length::Fill);

        let mut jump = button(text("Show").size(11)).padding(4);
        if let Some(location_id) = &list_row.first_location {
            jump = jump.on_press(Message::JumpToLocation(location_id.clone()));
        }

        list = list.push(
            row![
                image(list_row.sprite.clone())
                    .width(Length::Fixed(28.0))
                    .height(Length::Fixed(28.0)),
                details,
                jump,
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

    container(scrollable(list).height(Length::Fill))
        .padding(12)
        .width(Length::Fixed(300.0))
        .height(Length::Fill)
        .into()
}
