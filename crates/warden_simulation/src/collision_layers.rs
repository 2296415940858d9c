//! Collision Layers Constants
//!
//! Битовые маски для `SpatialQuery` (overlap/raycast). Engine glue обязан
//! раскладывать коллайдеры по тем же слоям.
//!
//! - Layer 1 (0b1 = 1): Reserved
//! - Layer 2 (0b10 = 2): Actors (player, enemies)
//! - Layer 3 (0b100 = 4): Environment (walls, obstacles)
//! - Layer 4 (0b1000 = 8): Player hitbox (цель для perception/attack ray)

/// Layer 2: Actors (CharacterBody: player, NPC)
pub const COLLISION_LAYER_ACTORS: u32 = 0b10;

/// Layer 3: Environment (static obstacles, стены)
pub const COLLISION_LAYER_ENVIRONMENT: u32 = 0b100;

/// Layer 4: Player hitbox
pub const COLLISION_LAYER_PLAYER: u32 = 0b1000;

/// Mask: что блокирует взгляд (perception LOS)
pub const COLLISION_MASK_OBSTACLES: u32 = COLLISION_LAYER_ENVIRONMENT;

/// Mask: кого ищет perception overlap
pub const COLLISION_MASK_TARGETS: u32 = COLLISION_LAYER_PLAYER;

/// Mask: attack ray попадает и в стены, и в игрока (стена гасит выстрел)
pub const COLLISION_MASK_ATTACK_RAY: u32 = COLLISION_LAYER_ENVIRONMENT | COLLISION_LAYER_PLAYER;

/// Получить название слоя для debug логов
pub fn get_layer_name(layer_bits: u32) -> &'static str {
    match layer_bits {
        COLLISION_LAYER_ACTORS => "Actors",
        COLLISION_LAYER_ENVIRONMENT => "Environment",
        COLLISION_LAYER_PLAYER => "Player",
        _ => "Unknown",
    }
}

/// Пересекаются ли слои коллайдера с маской запроса
pub fn layers_match(layers: u32, mask: u32) -> bool {
    layers & mask != 0
}
