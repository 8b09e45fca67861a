//! 内置动作帧提示词。
//!
//! 每个动作由若干有序帧组成，所有帧共用同一参考图，
//! 提示词统一要求角色朝右、武器与轴心保持一致、透明背景。

/// 单帧提示词。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePrompt {
    pub name: String,
    pub prompt: String,
}

impl FramePrompt {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
        }
    }
}

/// 内置动作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSet {
    Attack,
    Jump,
    Dead,
}

const PREAMBLE: &str = "Generate an image of the following character according to this prompt.";
const FACE_RIGHT: &str = "CRITICAL: Character must face RIGHT direction.";

const ATTACK: [(&str, &str); 6] = [
    (
        "frame1_idle",
        "Pixel-art character facing RIGHT, idle ready stance: head slightly turned right, calm eyes forward, \
         torso upright and relaxed, right hand holding weapon low at side, left arm resting naturally, feet \
         shoulder-width apart, faint small glow at weapon tip, transparent background. The weapon must stay \
         EXACTLY the same as in the reference image: same shape, size, color and design details.",
    ),
    (
        "frame2_chargeup",
        "Pixel-art character facing RIGHT, charge-up pose: head focused on weapon tip, torso leaning slightly \
         back, right arm lifting weapon upward with elbow bent, left hand balancing, weight shifted backward, \
         small glowing orb forming at weapon tip with spark particles, transparent background.",
    ),
    (
        "frame3_aim",
        "Pixel-art character facing RIGHT, pre-attack aiming pose: head locked forward, torso leaning slightly \
         forward, right arm extending weapon forward, left arm near chest, front foot pressing down, energy orb \
         at weapon tip growing brighter with small electric arcs, transparent background.",
    ),
    (
        "frame4_lunge",
        "Pixel-art character facing RIGHT, lunge pose: torso thrust forward, right arm fully extended pushing \
         weapon ahead, left arm stretched back for balance, front leg bearing weight, weapon tip glowing at peak \
         intensity with motion trails, transparent background.",
    ),
    (
        "frame5_impact",
        "Pixel-art character facing RIGHT, attack impact pose: torso leaning into the strike, right arm extended \
         holding weapon, front foot planted, massive energy burst from weapon tip with bright white core and \
         colored shockwave rings, spark particles around, transparent background.",
    ),
    (
        "frame6_aftershock",
        "Pixel-art character facing RIGHT, aftershock pose: head slightly lowered, weapon still extended after \
         impact, feet in the same stance as the impact frame, residual light rings fading into transparency, \
         small sparks dispersing, transparent background. Keep the same pivot and proportions as previous frames.",
    ),
];

const JUMP: [(&str, &str); 6] = [
    (
        "frame1_prepare",
        "Pixel-art character facing RIGHT, jump preparation pose: torso slightly crouched, knees bent, right hand \
         holding the same weapon low near waist, feet pressing down as if gathering strength, transparent \
         background. Maintain SAME weapon design as reference, SAME pivot as other actions.",
    ),
    (
        "frame2_launch",
        "Pixel-art character facing RIGHT, jump launch pose: head oriented slightly upward, both legs extending \
         from crouch, right arm pulling weapon back for momentum, small dust particles under feet, transparent \
         background. SAME weapon, proportions and pivot.",
    ),
    (
        "frame3_air_rise",
        "Pixel-art character facing RIGHT, mid-air rising pose: torso extended, legs tucked toward body, weapon \
         held diagonally across the front, faint motion lines beneath, transparent background. SAME weapon and pivot.",
    ),
    (
        "frame4_air_peak",
        "Pixel-art character facing RIGHT, jump apex pose: torso upright, legs lightly bent as if floating, weapon \
         held horizontally, subtle floating particles, transparent background. SAME weapon, proportions and pivot.",
    ),
    (
        "frame5_air_fall",
        "Pixel-art character facing RIGHT, descending pose: head angled slightly down, weapon angled downward \
         preparing to land, legs extended downward with knees slightly bent, thin downward motion trails, \
         transparent background. SAME weapon and pivot.",
    ),
    (
        "frame6_land",
        "Pixel-art character facing RIGHT, landing impact pose: deep knee bend, front foot planted, weapon gripped \
         forward for stability, small dust clouds and a tiny shock ring under feet, transparent background. \
         SAME weapon, SAME pivot as previous frames.",
    ),
];

const DEAD: [(&str, &str); 5] = [
    (
        "frame1_hit_recoil",
        "Pixel-art character facing RIGHT, just hit by a strong impact: head snapping backward, eyes wide with \
         shock, torso bending back about 15 degrees, one foot losing balance, arms flailing, weapon shaking in \
         hand. Expression stunned and in pain. Transparent background. SAME weapon.",
    ),
    (
        "frame2_knockback_airborne",
        "Pixel-art character facing RIGHT, lifted into the air mid-knockback: head tilted back further, eyes half \
         open, torso rotated backward about 45 degrees, legs lifting to the right, arms spread. Transparent \
         background. SAME weapon and pivot.",
    ),
    (
        "frame3_mid_flip",
        "Pixel-art character facing RIGHT, slow mid-air rotation about 75 degrees from upright, head left of legs, \
         arms extended diagonally, eyes half closed, weapon tilting back but still in hand, rotation clockwise. \
         Transparent background. SAME weapon and pivot.",
    ),
    (
        "frame4_fall_transition",
        "Pixel-art character facing RIGHT, descending mid-fall about 140 degrees from upright, head left of legs \
         and near horizontal, arms and weapon trailing downward, body limp, eyes mostly closed. Transparent \
         background. SAME weapon, pivot and proportions.",
    ),
    (
        "frame5_rest",
        "Pixel-art character facing RIGHT, lying motionless on the ground, head left of torso, eyes closed, limbs \
         relaxed and heavy, weapon on the ground next to the hand with no glow. Transparent background. SAME weapon.",
    ),
];

impl ActionSet {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "attack" => Some(Self::Attack),
            "jump" => Some(Self::Jump),
            "dead" => Some(Self::Dead),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Jump => "jump",
            Self::Dead => "dead",
        }
    }

    /// 按顺序返回完整帧提示词。
    pub fn frames(self) -> Vec<FramePrompt> {
        let table: &[(&str, &str)] = match self {
            Self::Attack => &ATTACK,
            Self::Jump => &JUMP,
            Self::Dead => &DEAD,
        };

        table
            .iter()
            .map(|(name, body)| {
                FramePrompt::new(*name, format!("{}\n\n{} {}", PREAMBLE, body, FACE_RIGHT))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_counts_match_actions() {
        assert_eq!(ActionSet::Attack.frames().len(), 6);
        assert_eq!(ActionSet::Jump.frames().len(), 6);
        assert_eq!(ActionSet::Dead.frames().len(), 5);
    }

    #[test]
    fn every_frame_requires_facing_right() {
        for action in [ActionSet::Attack, ActionSet::Jump, ActionSet::Dead] {
            for frame in action.frames() {
                assert!(frame.prompt.starts_with(PREAMBLE), "{}", frame.name);
                assert!(frame.prompt.ends_with(FACE_RIGHT), "{}", frame.name);
            }
        }
    }

    #[test]
    fn parse_accepts_known_names_only() {
        assert_eq!(ActionSet::parse(" Attack "), Some(ActionSet::Attack));
        assert_eq!(ActionSet::parse("dead").map(ActionSet::as_str), Some("dead"));
        assert_eq!(ActionSet::parse("walk"), None);
    }
}
