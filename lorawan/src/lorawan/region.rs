/// LoRaWAN regional band plan
///
/// The discriminant doubles as the bit position inside a [`RegionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Region {
    /// AS band on 923MHz
    AS923 = 0,
    /// Australian band on 915MHz
    AU915 = 1,
    /// Chinese band on 470MHz
    CN470 = 2,
    /// Chinese band on 779MHz
    CN779 = 3,
    /// European band on 433MHz
    EU433 = 4,
    /// European band on 868MHz
    EU868 = 5,
    /// South Korean band on 920MHz
    KR920 = 6,
    /// Indian band on 865MHz
    IN865 = 7,
    /// North American band on 915MHz
    US915 = 8,
    /// Russian band on 864MHz
    RU864 = 9,
}

impl Region {
    /// Every region known to the coordinator
    pub const ALL: [Region; 10] = [
        Region::AS923,
        Region::AU915,
        Region::CN470,
        Region::CN779,
        Region::EU433,
        Region::EU868,
        Region::KR920,
        Region::IN865,
        Region::US915,
        Region::RU864,
    ];

    /// Bit mask of this region inside a [`RegionSet`]
    pub const fn mask(self) -> u16 {
        1 << (self as u8)
    }
}

/// Set of regions the MAC engine was built with
///
/// Built once at startup from the list of enabled band plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegionSet(u16);

impl RegionSet {
    /// Empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Set holding every known region
    pub fn all() -> Self {
        Self::from_regions(&Region::ALL)
    }

    /// Build a set from a list of enabled regions
    pub fn from_regions(regions: &[Region]) -> Self {
        regions.iter().fold(Self::empty(), |set, &region| set.with(region))
    }

    /// Return a copy of the set with `region` added
    pub const fn with(self, region: Region) -> Self {
        Self(self.0 | region.mask())
    }

    /// Add a region to the set
    pub fn insert(&mut self, region: Region) {
        self.0 |= region.mask();
    }

    /// Check whether a region is enabled
    pub const fn contains(&self, region: Region) -> bool {
        self.0 & region.mask() != 0
    }

    /// Check whether no region is enabled
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Raw bit mask
    pub const fn bits(&self) -> u16 {
        self.0
    }
}
