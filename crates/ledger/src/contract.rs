// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::sol;

sol! {
    #[derive(Debug)]
    interface IScoreLedger {
        event ScoreSubmitted(address indexed user, uint256 index, bytes32 score);

        function submitScore(bytes32 score, bytes inputProof) external;
        function getScoreHistory(address user) external view returns (bytes32[] memory);
        function getSubmitCount(address user) external view returns (uint256);
    }
}
