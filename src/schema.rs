//! Attribute schema: the closed set of trait categories and allowed values.
//!
//! The schema is fixed at build time from the collection's trait tables and
//! constructed explicitly at startup — it is configuration passed into the
//! query engine, not ambient state. The engine uses it only to validate
//! requests; predicate evaluation works off item data and tolerates traits
//! the schema does not know about.

use crate::error::{GalleryError, Result};
use crate::models::TraitMap;

/// Ordered mapping from category name to the legal values for that category.
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    categories: Vec<AttributeCategory>,
}

#[derive(Debug, Clone)]
struct AttributeCategory {
    name: String,
    values: Vec<String>,
}

/// Requested attribute filters: category → OR'd values.
pub type AttributeFilters = std::collections::BTreeMap<String, Vec<String>>;

impl AttributeSchema {
    /// Builds a schema from `(category, values)` pairs, preserving order.
    pub fn from_categories<C, V>(categories: impl IntoIterator<Item = (C, Vec<V>)>) -> Self
    where
        C: Into<String>,
        V: Into<String>,
    {
        Self {
            categories: categories
                .into_iter()
                .map(|(name, values)| AttributeCategory {
                    name: name.into(),
                    values: values.into_iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }

    /// Category names in schema order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Legal values for a category, in schema order.
    pub fn values_for(&self, category: &str) -> Result<&[String]> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| GalleryError::UnknownCategory(category.to_string()))
    }

    /// Validates requested filters against the schema.
    ///
    /// Category names must match exactly; values are accepted
    /// case-insensitively (matching the predicate engine's comparison).
    /// Categories with an empty value list are still checked for existence
    /// even though they impose no constraint at evaluation time.
    pub fn validate_filters(&self, filters: &AttributeFilters) -> Result<()> {
        for (category, values) in filters {
            let legal = self.values_for(category)?;
            for value in values {
                let known = legal.iter().any(|v| v.eq_ignore_ascii_case(value));
                if !known {
                    return Err(GalleryError::UnknownValue {
                        category: category.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// True when every trait on the item belongs to the schema. Not used on
    /// the query path (unknown traits are tolerated there); exposed for
    /// snapshot inspection tooling.
    pub fn covers(&self, traits: &TraitMap) -> bool {
        traits.iter().all(|(category, value)| {
            self.values_for(category)
                .map(|legal| legal.iter().any(|v| v.eq_ignore_ascii_case(value)))
                .unwrap_or(false)
        })
    }

    /// The ENS Maxis trait tables.
    pub fn ens_maxis() -> Self {
        Self::from_categories([
            (
                "Avatar",
                str_vec(&[
                    "Zombie",
                    "Male",
                    "Female",
                    "AliENS",
                    "Panda",
                    "Ape",
                    "Numbers Guy",
                    "Ethmoji",
                    "Cheetah",
                    "Kangaroo",
                ]),
            ),
            (
                "Background",
                str_vec(&[
                    "Bubbles",
                    "Purple",
                    "Dark Grey",
                    "Magenta",
                    "Wallpaper",
                    "Pink",
                    "Orange",
                    "Passionfruit",
                    "Dark Web",
                    "Yellow",
                    "Blue",
                    "Red",
                    "Textured Green",
                    "Picasso",
                    "Matrix (Gold)",
                    "Matrix (Green)",
                    "Stars",
                    "Space Travel",
                ]),
            ),
            (
                "Maxis Ring",
                str_vec(&[
                    "Golden",
                    "Metal",
                    "Green",
                    "Galaxy",
                    "Orange",
                    "Trippy",
                    "Sky Blue",
                    "Charcoal",
                    "Crocodile Skin",
                    "Aquamarine",
                    "Purple",
                    "Yellow",
                    "Robot",
                    "Grey",
                    "Pink",
                    "Jungle",
                    "Electric",
                    "420",
                    "Magenta",
                    "Diamond",
                    "Zombie Slayer",
                    "Worldwide",
                    "Flames",
                ]),
            ),
            (
                "Body",
                str_vec(&[
                    "Zombie",
                    "Dark",
                    "Medium",
                    "Light",
                    "Blue Martian",
                    "Panda",
                    "Ape",
                    "Tatted Ape",
                    "Numbers Guy (Medium)",
                    "Ethmoji",
                    "Cheetah",
                    "Kangaroo",
                    "Numbers Guy (Light)",
                    "Numbers Guy (Dark)",
                ]),
            ),
            (
                "Head",
                str_vec(&[
                    "Zombie",
                    "Dark",
                    "Medium",
                    "Ear Bitten Off",
                    "Light",
                    "Blue Martian",
                    "Panda",
                    "Ape",
                    "Beats by Martian",
                    "Numbers Guy (Medium)",
                    "Ethmoji",
                    "Cheetah",
                    "You Should See The Other Guy",
                    "Numbers Guy (Light)",
                    "Kangaroo",
                    "Numbers Guy (Dark)",
                ]),
            ),
            (
                "Eyes",
                str_vec(&[
                    "Hanging Eye",
                    "Determined",
                    "Dafuq",
                    "Serious Wink",
                    "Stern",
                    "Crazed",
                    "Stare",
                    "Mutation",
                    "Furious",
                    "Lava",
                    "Purple Haze",
                    "Angry",
                    "Wink",
                    "Panda",
                    "Rage",
                    "White",
                    "Lantern",
                    "Scar",
                    "War",
                    "Numbers Guy",
                    "Ethmoji",
                    "Cheetah",
                    "Kangaroo",
                    "Kangaroo (Punched)",
                ]),
            ),
            (
                "Mouth",
                str_vec(&[
                    "Cuban",
                    "Bubblegum",
                    "Smile",
                    "Kiss",
                    "Bearded Carnivore",
                    "Gold Tooth",
                    "Pissed",
                    "Juicy Lips",
                    "Happy",
                    "Mutant Drool",
                    "Carnivore",
                    "Beep-Bop",
                    "Cheese",
                    "Seductive",
                    "Panda",
                    "Moustache",
                    "Oooo-oo-ahh-ah",
                    "Scream",
                    "Flesh Eater",
                    "Pearly Whites",
                    "Laughing",
                    "Numbers Guy",
                    "Ethmoji",
                    "Cheetah",
                    "Kangaroo",
                    "Kangaroo (Punched)",
                ]),
            ),
            (
                "Hair",
                str_vec(&[
                    "Hazard",
                    "Lucky Charms",
                    "Afro Puff",
                    "Fade",
                    "Braids",
                    "Fuqboi",
                    "Electric Blue",
                    "Highlights",
                    "Wavy",
                    "Octopus",
                    "Blue",
                    "High Top",
                    "Pixie Cut",
                    "Chun Li Buns",
                    "Bald",
                    "Redhead",
                    "Fro",
                    "Sh-Ape",
                    "Pink Hair",
                    "Dreads",
                    "Great Ape Ponytail",
                    "Open Brain",
                    "The Dino",
                    "Slicked Back",
                    "Ponytail",
                ]),
            ),
            (
                "Clothing",
                str_vec(&[
                    "Walking Dead Sheriff",
                    "Beach Tank Top",
                    "Tube Top",
                    "Black Hoodie",
                    "Hoodie",
                    "Leather Jacket",
                    "Kung Fu Suit",
                    "ENS Blouse",
                    "Punks Jacket",
                    "ENS Tank Top",
                    "ENS Tactical",
                    "ENS Army Tee",
                    "Cheongsam",
                    "Letterman Jacket",
                    "Miami Vibes",
                    "Blue Kimono",
                    "ENS Tee",
                    "Summer Graphic Tee",
                    "Orange T-Shirt",
                    "Tie-Dye Top",
                    "Reptile T-Shirt",
                    "Saturn Tank Top",
                    "White Tank Top (Ripped)",
                    "Ripped",
                    "Black T-Shirt",
                    "DBZ",
                    "Tux",
                    "Kandura",
                ]),
            ),
            (
                "Nose",
                str_vec(&["Zombie Nose", "Default", "Runny Nose", "No Nose Ring"]),
            ),
            (
                "Eyewear",
                str_vec(&[
                    "Punk Glasses",
                    "Green Shades",
                    "Blue Shades",
                    "Futuristic Glasses",
                    "Shades",
                    "Third Eye",
                    "Laugh Tears",
                    "Golden Glasses",
                    "Steampunk Shades",
                ]),
            ),
            (
                "Accessory",
                str_vec(&[
                    "Silver Earring",
                    "Piercing",
                    "Skull Piercing",
                    "Hoops",
                    "Nose Ring",
                    "Gold Nose Ring",
                    "FUD U Tattoo",
                    "Gold Chain",
                    "Gold Earring",
                    "Septum Nose Ring",
                    "Ginger Goatee",
                    "DBZ",
                    "Mutant Earwax",
                    "Dog Tag",
                    "Bamboo",
                    "Bitten Coin",
                    "10k Earring",
                    "Boxing Gloves",
                    "999 Set",
                ]),
            ),
            (
                "Headwear",
                str_vec(&[
                    "Red Cap",
                    "Astro Helmet",
                    "Bandana",
                    "Ethmoji Hat",
                    "Army Helmet",
                    "Headphones",
                    "Beanie",
                    "Cat Ears",
                    "Crown",
                    "Digital Headwear",
                    "QueENS Crown",
                    "Heisenberg",
                    "Barbed Wire",
                    "Banana Sweat Band",
                    "Australian Hat",
                    "Keffiyeh",
                    "Sedge Hat",
                    "Poker Hat",
                ]),
            ),
        ])
    }
}

fn str_vec(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
