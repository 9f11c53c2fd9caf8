use iced::widget::{button, canvas, column, container, row, text};
use iced::{Element, Length, Task, Theme};
use rfd::FileDialog;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

mod capture;
mod data;
mod filter;
mod sprite;
mod ui;

use capture::store::CaptureStore;
use data::loader;
use data::model::{Dataset, Version};
use filter::predicate::entry_matches;
use filter::resolver::location_entries;
use filter::state::{FilterState, Method, Rod};
use sprite::SpriteCache;
use ui::map::{MapView, Marker, DEFAULT_MAP_SIZE};
use ui::panel::{self, ListRow};
use ui::popup::{self, Popup};

/// Main application state
struct DexAtlas {
    /// The loaded reference data; empty until the startup load finishes.
    dataset: Dataset,
    /// Current filter-panel snapshot.
    filters: FilterState,
    /// Persisted capture flags and their surface registry.
    captures: CaptureStore,
    /// Sprite handles and placeholders.
    sprites: SpriteCache,
    /// Map viewport and markers.
    map: MapView,
    /// Popup payload for the selected location, if any.
    popup: Option<Popup>,
    /// Currently selected location id.
    selected_location: Option<String>,
    /// Derived creature list rows.
    list_rows: Vec<ListRow>,
    /// Every distinct type tag in the dataset, for the chip grid.
    known_types: Vec<String>,
    /// Assets directory holding data/, images/ and sprites/.
    assets_dir: PathBuf,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Background dataset load completed
    DatasetLoaded(Result<Dataset, String>),
    /// User wants to point the app at a different assets folder
    PickAssetsDir,
    VersionSelected(Version),
    ObtainableOnlyToggled(bool),
    StarterOnlyToggled(bool),
    GiftOnlyToggled(bool),
    TypesEnabledToggled(bool),
    TypeChipToggled(String),
    MethodEnabledToggled(bool),
    MethodSelected(Method),
    RodSelected(Rod),
    FiltersReset,
    MapZoomed(f32),
    MapPanned(cgmath::Vector2<f32>),
    LocationClicked(String),
    JumpToLocation(String),
    ClosePopup,
    CaptureToggled { key: String, caught: bool },
}

impl DexAtlas {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // If this fails, we panic because the app cannot track anything
        // without its database
        let captures = CaptureStore::new()
            .expect("Failed to initialize capture database. Check permissions and disk space.");

        let filters = load_filters();
        let assets_dir = PathBuf::from("assets");
        let sprites = SpriteCache::scan(&assets_dir.join("sprites"));

        let mut map = MapView::default();
        let (image, image_size) = load_map_image(&assets_dir);
        map.image = image;
        map.image_size = image_size;
        map.center = iced::Point::new(image_size.0 / 2.0, image_size.1 / 2.0);

        let atlas = DexAtlas {
            dataset: Dataset::default(),
            filters,
            captures,
            sprites,
            map,
            popup: None,
            selected_location: None,
            list_rows: Vec::new(),
            known_types: Vec::new(),
            assets_dir: assets_dir.clone(),
            status: "Loading data...".to_string(),
        };

        (
            atlas,
            Task::perform(
                loader::load_dataset(assets_dir.join("data")),
                Message::DatasetLoaded,
            ),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::DatasetLoaded(Ok(dataset)) => {
                self.known_types = collect_type_tags(&dataset);
                self.status = format!(
                    "{} locations, {} creatures",
                    dataset.locations.len(),
                    dataset.creatures.len()
                );
                self.dataset = dataset;
                self.refresh();
            }
            Message::DatasetLoaded(Err(e)) => {
                // Degrade to an empty dataset: nothing visible, no crash.
                eprintln!("⚠️  Data load failed: {}", e);
                self.status = format!("Data load failed: {}", e);
                self.dataset = Dataset::default();
                self.refresh();
            }
            Message::PickAssetsDir => {
                // Show the native folder picker dialog
                let folder = FileDialog::new()
                    .set_title("Select Assets Folder")
                    .pick_folder();

                if let Some(assets_dir) = folder {
                    self.status = format!("Loading from {}...", assets_dir.display());
                    self.sprites = SpriteCache::scan(&assets_dir.join("sprites"));
                    let (image, image_size) = load_map_image(&assets_dir);
                    self.map.image = image;
                    self.map.image_size = image_size;
                    self.map.center =
                        iced::Point::new(image_size.0 / 2.0, image_size.1 / 2.0);
                    self.assets_dir = assets_dir.clone();

                    return Task::perform(
                        loader::load_dataset(assets_dir.join("data")),
                        Message::DatasetLoaded,
                    );
                }
            }
            Message::VersionSelected(version) => {
                self.filters.version = version;
                self.filters_changed();
            }
            Message::ObtainableOnlyToggled(on) => {
                self.filters.obtainable_only = on;
                self.filters_changed();
            }
            Message::StarterOnlyToggled(on) => {
                self.filters.starter_only = on;
                self.filters_changed();
            }
            Message::GiftOnlyToggled(on) => {
                self.filters.gift_only = on;
                self.filters_changed();
            }
            Message::TypesEnabledToggled(on) => {
                self.filters.types_enabled = on;
                self.filters_changed();
            }
            Message::TypeChipToggled(tag) => {
                self.filters.toggle_type(&tag);
                self.filters_changed();
            }
            Message::MethodEnabledToggled(on) => {
                self.filters.method_enabled = on;
                self.filters_changed();
            }
            Message::MethodSelected(method) => {
                self.filters.method = method;
                self.filters_changed();
            }
            Message::RodSelected(rod) => {
                self.filters.rod = rod;
                self.filters_changed();
            }
            Message::FiltersReset => {
                self.filters.reset();
                self.filters_changed();
            }
            Message::MapZoomed(delta) => {
                self.map.apply_zoom(delta);
            }
            Message::MapPanned(delta) => {
                self.map.apply_pan(delta);
            }
            Message::LocationClicked(location_id) => {
                self.selected_location = Some(location_id);
                self.refresh();
            }
            Message::JumpToLocation(location_id) => {
                if let Some(location) = self.dataset.location(&location_id) {
                    // coordinates are (row, col): column is x, row is y
                    self.map.focus_on(iced::Point::new(
                        location.coordinates[1],
                        location.coordinates[0],
                    ));
                }
                self.selected_location = Some(location_id);
                self.refresh();
            }
            Message::ClosePopup => {
                self.selected_location = None;
                self.refresh();
            }
            Message::CaptureToggled { key, caught } => {
                // Persists and fans out to every bound surface; the view
                // reads the updated surface states on the next rebuild.
                self.captures.toggle(&key, caught);
            }
        }

        Task::none()
    }

    /// A filter changed: persist the panel and rebuild everything derived.
    fn filters_changed(&mut self) {
        save_filters(&self.filters);
        self.refresh();
    }

    /// Rebuild markers, popup and list from the dataset and filters.
    ///
    /// All checkbox surfaces are re-registered here, so the registry only
    /// ever holds surfaces that are actually rendered.
    fn refresh(&mut self) {
        self.captures.clear_surfaces();

        let mut markers = Vec::new();
        for location in &self.dataset.locations {
            let visible = location_entries(&self.dataset, location, self.filters.version)
                .iter()
                .any(|(creature_id, entry)| {
                    self.dataset
                        .creature(creature_id)
                        .map(|creature| {
                            entry_matches(&self.dataset, creature, entry, &self.filters)
                        })
                        .unwrap_or(false)
                });
            if visible {
                markers.push(Marker {
                    location_id: location.id.clone(),
                    name: location.name.clone(),
                    position: iced::Point::new(location.coordinates[1], location.coordinates[0]),
                    selected: self.selected_location.as_deref() == Some(location.id.as_str()),
                });
            }
        }
        self.map.markers = markers;

        self.popup = self
            .selected_location
            .as_ref()
            .and_then(|id| self.dataset.location(id).cloned())
            .map(|location| {
                popup::build_popup(
                    &self.dataset,
                    &location,
                    &self.filters,
                    &mut self.captures,
                    &mut self.sprites,
                )
            });

        self.list_rows = panel::build_list(
            &self.dataset,
            &self.filters,
            &mut self.captures,
            &mut self.sprites,
        );
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let toolbar = row![
            text("Dex Atlas").size(20),
            button(text("Open assets folder...").size(12)).on_press(Message::PickAssetsDir),
            text(self.assets_dir.display().to_string()).size(11),
            iced::widget::horizontal_space(),
            text(&self.status).size(12),
        ]
        .spacing(12)
        .padding(8)
        .align_y(iced::Alignment::Center);

        let side_panel: Element<Message> = match &self.popup {
            Some(popup) => popup::popup_view(popup, &self.captures),
            None => panel::list_view(&self.list_rows, &self.captures),
        };

        let content = row![
            panel::filter_panel(&self.filters, &self.known_types, &self.captures),
            canvas(&self.map).width(Length::Fill).height(Length::Fill),
            side_panel,
        ]
        .spacing(4);

        container(column![toolbar, content])
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application("Dex Atlas", DexAtlas::update, DexAtlas::view)
        .theme(DexAtlas::theme)
        .centered()
        .run_with(DexAtlas::new)
}

/// Every distinct type tag in the dataset, sorted, for the chip grid.
fn collect_type_tags(dataset: &Dataset) -> Vec<String> {
    let tags: BTreeSet<String> = dataset
        .creatures
        .iter()
        .flat_map(|creature| creature.types.iter().cloned())
        .collect();
    tags.into_iter().collect()
}

/// Load the map image from `<assets>/images/map.png`, falling back to the
/// default extent when the asset is missing. Purely cosmetic either way.
fn load_map_image(assets_dir: &Path) -> (Option<iced::widget::image::Handle>, (f32, f32)) {
    let path = assets_dir.join("images").join("map.png");
    match image::image_dimensions(&path) {
        Ok((width, height)) => {
            println!("🗺️  Map image {}x{} at {}", width, height, path.display());
            (
                Some(iced::widget::image::Handle::from_path(&path)),
                (width as f32, height as f32),
            )
        }
        Err(_) => {
            eprintln!("⚠️  No map image at {}, using flat backdrop", path.display());
            (None, DEFAULT_MAP_SIZE)
        }
    }
}

/// Where the filter panel is persisted between sessions.
fn filters_path() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(|| dirs::home_dir())
        .expect("Could not determine user data directory");
    path.push("dex-atlas");
    path.push("filters.json");
    path
}

/// Restore the previous session's filter panel, or defaults.
fn load_filters() -> FilterState {
    let path = filters_path();
    match std::fs::read_to_string(&path) {
        Ok(json) => match FilterState::from_json(&json) {
            Ok(filters) => filters,
            Err(e) => {
                eprintln!("⚠️  Ignoring unreadable {}: {}", path.display(), e);
                FilterState::new()
            }
        },
        Err(_) => FilterState::new(),
    }
}

/// Persist the filter panel. Fire-and-forget: a write failure only costs the
/// next session its restored panel.
fn save_filters(filters: &FilterState) {
    let path = filters_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match filters.to_json() {
        Ok(json) => {
            if let Err(e) = std::fs::write(&path, json) {
                eprintln!("⚠️  Failed to save filters: {}", e);
            }
        }
        Err(e) => eprintln!("⚠️  Failed to serialize filters: {}", e),
    }
}
