use std::str::FromStr;

use glam::{UVec2, Vec2, Vec3};
use log::info;
use roxmltree::{Document, Node};

use super::{Droplet, Terrain};
use crate::assets::AssetManager;
use crate::camera::DeltaCamera;
use crate::error::{ScenarioError, TerrainError};
use crate::mesh::Mesh;
use crate::world::{EntityId, World};

/// How a scenario's starting terrain is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainRecipe {
    Flat {
        dimensions: UVec2,
        height: f32,
    },
    Cone {
        dimensions: UVec2,
        center: Vec2,
        center_height: f32,
        slope: f32,
        min_height: Option<f32>,
    },
    Droplets {
        dimensions: UVec2,
        height: f32,
        droplets: Vec<Droplet>,
    },
    Heightmap {
        pgm: String,
        scaling: f32,
    },
}

impl TerrainRecipe {
    pub fn build(&self) -> Result<Terrain, TerrainError> {
        match self {
            Self::Flat { dimensions, height } => Terrain::flat(*dimensions, *height),
            Self::Cone {
                dimensions,
                center,
                center_height,
                slope,
                min_height: Some(min_height),
            } => Terrain::cone_flat(*dimensions, *center, *center_height, *slope, *min_height),
            Self::Cone {
                dimensions,
                center,
                center_height,
                slope,
                min_height: None,
            } => Terrain::cone(*dimensions, *center, *center_height, *slope),
            Self::Droplets {
                dimensions,
                height,
                droplets,
            } => Terrain::droplet(*dimensions, *height, droplets),
            Self::Heightmap { pgm, scaling } => Terrain::from_pgm(pgm.as_bytes(), *scaling),
        }
    }
}

/// A named starting state the player can load.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub recipe: TerrainRecipe,
}

impl Scenario {
    pub fn new(name: impl Into<String>, recipe: TerrainRecipe) -> Self {
        Self {
            name: name.into(),
            recipe,
        }
    }

    /// Replaces the world contents with this scenario's terrain and frames it
    /// with the camera.
    pub fn build(
        &self,
        world: &mut World,
        camera: &mut DeltaCamera,
        assets: &mut AssetManager<Mesh>,
    ) -> Result<EntityId, TerrainError> {
        let terrain = self.recipe.build()?;
        world.clear(assets);
        info!("building scene: {}", self.name);

        let dimensions = terrain.dimensions().as_vec2();
        camera.set_translation(Vec3::new(dimensions.x / 2.0, 0.0, dimensions.y / 2.0));
        camera.set_radius((dimensions.x * dimensions.y).sqrt());
        Ok(world.insert_terrain(terrain, assets))
    }
}

/// Ordered set of scenarios offered to the player.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainLibrary {
    entries: Vec<Scenario>,
}

impl Default for TerrainLibrary {
    fn default() -> Self {
        let droplet = |x, y| Droplet::new(x, y, 6.0);
        Self {
            entries: vec![
                Scenario::new(
                    "Droplet",
                    TerrainRecipe::Droplets {
                        dimensions: UVec2::new(20, 20),
                        height: 1.0,
                        droplets: vec![droplet(10, 10)],
                    },
                ),
                Scenario::new(
                    "Big Droplet",
                    TerrainRecipe::Cone {
                        dimensions: UVec2::new(100, 100),
                        center: Vec2::new(50.0, 50.0),
                        center_height: 5.0,
                        slope: -0.5,
                        min_height: Some(0.0),
                    },
                ),
                Scenario::new(
                    "Many Droplets",
                    TerrainRecipe::Droplets {
                        dimensions: UVec2::new(50, 50),
                        height: 1.0,
                        droplets: vec![
                            droplet(10, 10),
                            droplet(20, 20),
                            droplet(0, 10),
                            droplet(23, 28),
                            droplet(43, 38),
                            droplet(33, 8),
                            droplet(2, 44),
                        ],
                    },
                ),
            ],
        }
    }
}

impl TerrainLibrary {
    pub fn new(entries: Vec<Scenario>) -> Self {
        Self { entries }
    }

    /// Parses a scenario list such as:
    ///
    /// ```xml
    /// <scenarios>
    ///   <scenario name="Pond">
    ///     <droplet width="20" depth="20" height="1">
    ///       <drop x="10" y="10" height="6"/>
    ///     </droplet>
    ///   </scenario>
    /// </scenarios>
    /// ```
    ///
    /// Terrain elements are `<flat>`, `<cone>` (`min_height` optional),
    /// `<droplet>` and `<heightmap scaling="..">` wrapping plain PGM text.
    pub fn from_xml(xml: &str) -> Result<Self, ScenarioError> {
        let document = Document::parse(xml)?;
        let entries = document
            .descendants()
            .filter(|node| node.has_tag_name("scenario"))
            .map(parse_scenario)
            .collect::<Result<Vec<_>, _>>()?;
        if entries.is_empty() {
            return Err(ScenarioError::Empty);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, index: usize) -> Option<&Scenario> {
        self.entries.get(index)
    }

    /// Finds a scenario by case-insensitive name.
    pub fn find(&self, name: &str) -> Option<(usize, &Scenario)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, scenario)| scenario.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|scenario| scenario.name.as_str())
    }

    /// `index: name` pairs, the numbering `select_scenario` events use.
    pub fn listing(&self) -> String {
        self.names()
            .enumerate()
            .map(|(index, name)| format!("{index}: {name}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_scenario(node: Node<'_, '_>) -> Result<Scenario, ScenarioError> {
    let name = node
        .attribute("name")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(ScenarioError::MissingName)?
        .to_string();
    let terrain = node
        .children()
        .find(Node::is_element)
        .ok_or_else(|| ScenarioError::MissingTerrain(name.clone()))?;

    let attrs = Attributes {
        node: terrain,
        scenario: &name,
    };
    let recipe = match terrain.tag_name().name() {
        "flat" => TerrainRecipe::Flat {
            dimensions: attrs.dimensions()?,
            height: attrs.required("height")?,
        },
        "cone" => TerrainRecipe::Cone {
            dimensions: attrs.dimensions()?,
            center: Vec2::new(attrs.required("center_x")?, attrs.required("center_y")?),
            center_height: attrs.required("height")?,
            slope: attrs.required("slope")?,
            min_height: attrs.optional("min_height")?,
        },
        "droplet" => TerrainRecipe::Droplets {
            dimensions: attrs.dimensions()?,
            height: attrs.required("height")?,
            droplets: terrain
                .children()
                .filter(|child| child.has_tag_name("drop"))
                .map(|node| -> Result<Droplet, ScenarioError> {
                    let attrs = Attributes {
                        node,
                        scenario: &name,
                    };
                    Ok(Droplet::new(
                        attrs.required("x")?,
                        attrs.required("y")?,
                        attrs.required("height")?,
                    ))
                })
                .collect::<Result<Vec<_>, _>>()?,
        },
        "heightmap" => TerrainRecipe::Heightmap {
            pgm: terrain.text().unwrap_or_default().trim().to_string(),
            scaling: attrs.optional("scaling")?.unwrap_or(1.0),
        },
        other => {
            return Err(ScenarioError::UnknownTerrain {
                scenario: name.clone(),
                kind: other.to_string(),
            })
        }
    };
    Ok(Scenario { name, recipe })
}

struct Attributes<'a, 'input, 's> {
    node: Node<'a, 'input>,
    scenario: &'s str,
}

impl Attributes<'_, '_, '_> {
    fn optional<T: FromStr>(&self, attribute: &str) -> Result<Option<T>, ScenarioError> {
        self.node
            .attribute(attribute)
            .map(|value| value.trim().parse::<T>().map_err(|_| self.invalid(attribute)))
            .transpose()
    }

    fn required<T: FromStr>(&self, attribute: &str) -> Result<T, ScenarioError> {
        self.optional(attribute)?
            .ok_or_else(|| self.invalid(attribute))
    }

    fn dimensions(&self) -> Result<UVec2, ScenarioError> {
        Ok(UVec2::new(self.required("width")?, self.required("depth")?))
    }

    fn invalid(&self, attribute: &str) -> ScenarioError {
        ScenarioError::InvalidAttribute {
            scenario: self.scenario.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec2;
    use once_cell::sync::Lazy;

    use super::*;

    static LIBRARY_XML: Lazy<String> = Lazy::new(|| {
        r#"<scenarios>
  <scenario name="Pond">
    <droplet width="8" depth="6" height="1">
      <drop x="2" y="3" height="4"/>
    </droplet>
  </scenario>
  <scenario name="Hill">
    <cone width="9" depth="9" center_x="4" center_y="4" height="3" slope="-1" min_height="0.5"/>
  </scenario>
  <scenario name="Map">
    <heightmap scaling="2">P2 2 2 4 0 1 2 4</heightmap>
  </scenario>
</scenarios>"#
            .to_string()
    });

    #[test]
    fn default_library_has_builtin_scenarios() {
        let library = TerrainLibrary::default();
        assert_eq!(
            library.names().collect::<Vec<_>>(),
            vec!["Droplet", "Big Droplet", "Many Droplets"]
        );
        assert_eq!(
            library.listing(),
            "0: Droplet, 1: Big Droplet, 2: Many Droplets"
        );
        for index in 0..library.len() {
            assert!(library.get(index).unwrap().recipe.build().is_ok());
        }
    }

    #[test]
    fn parses_scenarios_from_xml() {
        let library = TerrainLibrary::from_xml(&LIBRARY_XML).unwrap();
        assert_eq!(library.len(), 3);

        let pond = library.get(0).unwrap().recipe.build().unwrap();
        assert_eq!(pond.dimensions(), UVec2::new(8, 6));
        assert_eq!(pond.heights().get(IVec2::new(2, 3)), Some(&4.0));

        let (index, hill) = library.find("hill").unwrap();
        assert_eq!(index, 1);
        let hill = hill.recipe.build().unwrap();
        assert_eq!(hill.height_range(), (0.5, 3.0));

        let map = library.get(2).unwrap().recipe.build().unwrap();
        assert_eq!(map.heights().get(IVec2::new(1, 1)), Some(&2.0));
    }

    #[test]
    fn reports_bad_scenarios() {
        assert!(matches!(
            TerrainLibrary::from_xml("<scenarios/>"),
            Err(ScenarioError::Empty)
        ));
        assert!(matches!(
            TerrainLibrary::from_xml("<scenarios><scenario><flat/></scenario></scenarios>"),
            Err(ScenarioError::MissingName)
        ));
        assert!(matches!(
            TerrainLibrary::from_xml(
                r#"<scenarios><scenario name="A"><flat width="2" depth="x" height="1"/></scenario></scenarios>"#
            ),
            Err(ScenarioError::InvalidAttribute { attribute, .. }) if attribute == "depth"
        ));
        assert!(matches!(
            TerrainLibrary::from_xml(r#"<scenarios><scenario name="A"><lava/></scenario></scenarios>"#),
            Err(ScenarioError::UnknownTerrain { kind, .. }) if kind == "lava"
        ));
        assert!(matches!(
            TerrainLibrary::from_xml("<scenarios"),
            Err(ScenarioError::Xml(_))
        ));
    }

    #[test]
    fn build_frames_terrain_with_camera() {
        let library = TerrainLibrary::default();
        let mut world = World::new();
        let mut camera = DeltaCamera::default();
        let mut assets = AssetManager::new();
        library
            .get(1)
            .unwrap()
            .build(&mut world, &mut camera, &mut assets)
            .unwrap();
        library
            .get(0)
            .unwrap()
            .build(&mut world, &mut camera, &mut assets)
            .unwrap();
        assert_eq!(world.len(), 1);
        assert_eq!(assets.len(), 1);
        assert_eq!(camera.translation(), Vec3::new(10.0, 0.0, 10.0));
        assert_eq!(camera.radius(), 20.0);
    }
}
